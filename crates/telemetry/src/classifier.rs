//! Error classifier — turns a [`Failure`] into an [`ErrorContext`].
//!
//! Classification is pure: no I/O, no logging, and the same failure always
//! yields the same context. The only collaborator is the error catalog,
//! injected at construction and used read-only to resolve category and
//! canonical name of cataloged errors.

use crate::TelemetryError;
use crate::context::ErrorContext;
use smelter_core::{ErrorCatalog, Failure};
use std::sync::Arc;

/// Classifies failures against an error catalog.
#[derive(Debug, Clone)]
pub struct ErrorClassifier {
    catalog: Arc<ErrorCatalog>,
}

impl ErrorClassifier {
    pub fn new(catalog: Arc<ErrorCatalog>) -> Self {
        Self { catalog }
    }

    /// The catalog this classifier resolves ids against.
    pub fn catalog(&self) -> &ErrorCatalog {
        &self.catalog
    }

    /// Classify `failure`.
    ///
    /// # Panics
    ///
    /// Panics if `failure` is a catalog error whose id is not registered in
    /// the catalog. Raise sites and the catalog must agree; use
    /// [`try_contextualize`](Self::try_contextualize) to get the mismatch as
    /// an error instead.
    pub fn contextualize(&self, failure: &Failure) -> ErrorContext {
        self.try_contextualize(failure)
            .unwrap_or_else(|e| panic!("error catalog out of sync: {e}"))
    }

    /// Classify `failure`, reporting an unregistered catalog id as
    /// [`TelemetryError::UnknownErrorId`].
    pub fn try_contextualize(&self, failure: &Failure) -> Result<ErrorContext, TelemetryError> {
        // Plugin attribution wins over the catalog fields it wraps.
        match failure {
            Failure::Plugin(e) => Ok(ErrorContext::Plugin {
                message: e.message().to_string(),
                plugin_name: e.plugin_name.clone(),
            }),
            Failure::Catalog(e) => {
                let entry = self
                    .catalog
                    .lookup(e.number)
                    .ok_or(TelemetryError::UnknownErrorId(e.number))?;
                Ok(ErrorContext::Catalog {
                    message: e.message.clone(),
                    id: e.number,
                    context_message: e.descriptor.message.clone(),
                    description: e.descriptor.description.clone(),
                    title: e.descriptor.title.clone(),
                    name: entry.name.clone(),
                    category: entry.category.clone(),
                })
            }
            Failure::Generic { message } => Ok(ErrorContext::Generic {
                message: message.clone(),
            }),
        }
    }
}
