//! Failure values — what callers catch and hand to analytics.
//!
//! A [`Failure`] is one of three closed variants, decided where the error is
//! raised. Nothing downstream needs to inspect types at runtime.

use crate::catalog::{CatalogEntry, ErrorDescriptor};
use crate::error::Result;
use crate::template::{TemplateArgs, render_template};
use std::fmt;

/// A raised error registered in the [`ErrorCatalog`](crate::ErrorCatalog).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("SM{number}: {message}")]
pub struct CatalogError {
    /// Stable numeric id of the catalog entry.
    pub number: u32,
    /// The descriptor the error was raised from.
    pub descriptor: ErrorDescriptor,
    /// The rendered message.
    pub message: String,
}

impl CatalogError {
    /// Raise `entry`, rendering its message template with `args`.
    pub fn new(entry: &CatalogEntry, args: &TemplateArgs) -> Result<Self> {
        let message = render_template(&entry.descriptor.message, args)?;
        Ok(Self {
            number: entry.number(),
            descriptor: entry.descriptor.clone(),
            message,
        })
    }

    /// Raise `entry` without arguments; the template is used verbatim.
    pub fn raw(entry: &CatalogEntry) -> Self {
        Self {
            number: entry.number(),
            descriptor: entry.descriptor.clone(),
            message: entry.descriptor.message.clone(),
        }
    }

    /// Attribute this error to a plugin.
    pub fn in_plugin(self, plugin_name: impl Into<String>) -> PluginError {
        PluginError {
            plugin_name: plugin_name.into(),
            error: self,
        }
    }
}

/// A catalog error raised by a plugin.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{plugin_name}: {error}")]
pub struct PluginError {
    /// Declared name of the plugin that raised the error.
    pub plugin_name: String,
    #[source]
    pub error: CatalogError,
}

impl PluginError {
    /// The rendered message of the wrapped catalog error.
    pub fn message(&self) -> &str {
        &self.error.message
    }
}

/// Any failure a caller may report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Failure {
    /// Anything outside the catalog; only its message is known.
    Generic { message: String },
    /// A cataloged error not attributed to a plugin.
    Catalog(CatalogError),
    /// A cataloged error raised by a plugin.
    Plugin(PluginError),
}

impl Failure {
    /// Wrap an unstructured error by its display text.
    pub fn generic(message: impl fmt::Display) -> Self {
        Self::Generic {
            message: message.to_string(),
        }
    }

    /// The raw message text.
    pub fn message(&self) -> &str {
        match self {
            Self::Generic { message } => message,
            Self::Catalog(e) => &e.message,
            Self::Plugin(e) => e.message(),
        }
    }

    /// Whether this failure belongs to the catalog taxonomy.
    pub fn is_cataloged(&self) -> bool {
        !matches!(self, Self::Generic { .. })
    }
}

impl fmt::Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Generic { message } => f.write_str(message),
            Self::Catalog(e) => write!(f, "{e}"),
            Self::Plugin(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for Failure {}

impl From<CatalogError> for Failure {
    fn from(e: CatalogError) -> Self {
        Self::Catalog(e)
    }
}

impl From<PluginError> for Failure {
    fn from(e: PluginError) -> Self {
        Self::Plugin(e)
    }
}
