//! Error types for the Smelter error taxonomy.
//!
//! Uses `thiserror` for ergonomic error definitions. These are the errors
//! raised while *building* the taxonomy (catalog construction, template
//! rendering), not the cataloged failures themselves.

use thiserror::Error;

/// The top-level error type for taxonomy operations.
#[derive(Debug, Error)]
pub enum Error {
    // --- Catalog construction ---
    #[error("Invalid error catalog: {message}")]
    Catalog { message: String },

    // --- Message templates ---
    #[error("Invalid message template '{template}': {reason}")]
    Template { template: String, reason: String },

    // --- Serialization ---
    #[error("Catalog parse error: {0}")]
    Toml(#[from] toml::de::Error),
}

impl Error {
    pub(crate) fn catalog(message: impl Into<String>) -> Self {
        Self::Catalog {
            message: message.into(),
        }
    }

    pub(crate) fn template(template: &str, reason: impl Into<String>) -> Self {
        Self::Template {
            template: template.to_string(),
            reason: reason.into(),
        }
    }
}

/// Result type alias using our Error.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_error_displays_correctly() {
        let err = Error::catalog("duplicate error id 104");
        assert!(err.to_string().contains("catalog"));
        assert!(err.to_string().contains("104"));
    }

    #[test]
    fn template_error_displays_correctly() {
        let err = Error::template("Missing %url", "unterminated variable");
        assert!(err.to_string().contains("Missing %url"));
        assert!(err.to_string().contains("unterminated"));
    }
}
