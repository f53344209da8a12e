//! Error context — the classification output handed to analytics.
//!
//! [`ErrorContext`] is the internal, tagged form: each variant carries exactly
//! the fields that exist for it. [`ErrorContextRecord`] is the flat wire shape
//! that transports and analytics backends consume verbatim. The tagged form
//! serializes through the record, so flattening only ever happens at the
//! serialization boundary.

use serde::{Deserialize, Serialize};
use smelter_core::ErrorCategory;

/// Which kind of failure a context describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorType {
    /// An unattributed catalog error.
    Catalog,
    /// A catalog error raised by a plugin.
    Plugin,
    /// Anything outside the catalog.
    Generic,
}

impl std::fmt::Display for ErrorType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Catalog => write!(f, "catalog"),
            Self::Plugin => write!(f, "plugin"),
            Self::Generic => write!(f, "generic"),
        }
    }
}

/// Classified failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(into = "ErrorContextRecord")]
pub enum ErrorContext {
    Generic {
        message: String,
    },
    Plugin {
        message: String,
        /// Declared name of the plugin that raised the error.
        plugin_name: String,
    },
    Catalog {
        message: String,
        /// Catalog id of the error.
        id: u32,
        /// The unrendered message template.
        context_message: String,
        description: String,
        title: String,
        /// Canonical catalog name, e.g. "INVALID_RPC_URL".
        name: String,
        /// The category owning `id`.
        category: ErrorCategory,
    },
}

impl ErrorContext {
    pub fn error_type(&self) -> ErrorType {
        match self {
            Self::Generic { .. } => ErrorType::Generic,
            Self::Plugin { .. } => ErrorType::Plugin,
            Self::Catalog { .. } => ErrorType::Catalog,
        }
    }

    /// True for plugin and catalog contexts.
    pub fn is_cataloged(&self) -> bool {
        self.error_type() != ErrorType::Generic
    }

    pub fn message(&self) -> &str {
        match self {
            Self::Generic { message }
            | Self::Plugin { message, .. }
            | Self::Catalog { message, .. } => message,
        }
    }

    /// Flatten into the wire shape.
    pub fn to_record(&self) -> ErrorContextRecord {
        ErrorContextRecord::from(self.clone())
    }

    /// The wire shape as a JSON value.
    pub fn to_json(&self) -> Result<serde_json::Value, crate::TelemetryError> {
        Ok(serde_json::to_value(self)?)
    }
}

/// Flat, serializable error context.
///
/// Optional fields are omitted from the output when absent. Which of them
/// are present is fixed by `error_type`:
///
/// | `errorType` | optional fields                                                    |
/// |-------------|--------------------------------------------------------------------|
/// | `generic`   | none                                                               |
/// | `plugin`    | `pluginName`                                                       |
/// | `catalog`   | `id`, `contextMessage`, `description`, `category`, `title`, `name` |
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorContextRecord {
    pub error_type: ErrorType,
    pub is_cataloged: bool,
    pub message: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plugin_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context_message: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<ErrorCategory>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl ErrorContextRecord {
    fn bare(error_type: ErrorType, message: String) -> Self {
        Self {
            error_type,
            is_cataloged: error_type != ErrorType::Generic,
            message,
            plugin_name: None,
            id: None,
            context_message: None,
            description: None,
            category: None,
            title: None,
            name: None,
        }
    }
}

impl From<ErrorContext> for ErrorContextRecord {
    fn from(context: ErrorContext) -> Self {
        match context {
            ErrorContext::Generic { message } => Self::bare(ErrorType::Generic, message),
            ErrorContext::Plugin {
                message,
                plugin_name,
            } => Self {
                plugin_name: Some(plugin_name),
                ..Self::bare(ErrorType::Plugin, message)
            },
            ErrorContext::Catalog {
                message,
                id,
                context_message,
                description,
                title,
                name,
                category,
            } => Self {
                id: Some(id),
                context_message: Some(context_message),
                description: Some(description),
                category: Some(category),
                title: Some(title),
                name: Some(name),
                ..Self::bare(ErrorType::Catalog, message)
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn network() -> ErrorCategory {
        ErrorCategory::new("Network", "NETWORK", 100, 199)
    }

    #[test]
    fn generic_record_has_no_optional_fields() {
        let context = ErrorContext::Generic {
            message: "disk full".into(),
        };
        assert_eq!(
            context.to_json().unwrap(),
            json!({ "errorType": "generic", "isCataloged": false, "message": "disk full" })
        );
    }

    #[test]
    fn plugin_record_only_adds_plugin_name() {
        let context = ErrorContext::Plugin {
            message: "boom".into(),
            plugin_name: "solidity-coverage".into(),
        };
        assert_eq!(
            context.to_json().unwrap(),
            json!({
                "errorType": "plugin",
                "isCataloged": true,
                "message": "boom",
                "pluginName": "solidity-coverage"
            })
        );
    }

    #[test]
    fn catalog_record_carries_full_field_set() {
        let context = ErrorContext::Catalog {
            message: "Invalid URL x for network local".into(),
            id: 104,
            context_message: "Invalid URL %url% for network %network%".into(),
            description: "Check the url.".into(),
            title: "Invalid RPC URL".into(),
            name: "INVALID_RPC_URL".into(),
            category: network(),
        };
        assert_eq!(
            context.to_json().unwrap(),
            json!({
                "errorType": "catalog",
                "isCataloged": true,
                "message": "Invalid URL x for network local",
                "id": 104,
                "contextMessage": "Invalid URL %url% for network %network%",
                "description": "Check the url.",
                "category": { "title": "Network", "name": "NETWORK", "min": 100, "max": 199 },
                "title": "Invalid RPC URL",
                "name": "INVALID_RPC_URL"
            })
        );
    }

    #[test]
    fn accessors_follow_variant() {
        let context = ErrorContext::Plugin {
            message: "m".into(),
            plugin_name: "p".into(),
        };
        assert_eq!(context.error_type(), ErrorType::Plugin);
        assert!(context.is_cataloged());
        assert_eq!(context.message(), "m");

        let record = context.to_record();
        assert!(record.is_cataloged);
        assert_eq!(record.plugin_name.as_deref(), Some("p"));
        assert!(record.id.is_none());
    }

    #[test]
    fn error_type_display() {
        assert_eq!(ErrorType::Catalog.to_string(), "catalog");
        assert_eq!(ErrorType::Plugin.to_string(), "plugin");
        assert_eq!(ErrorType::Generic.to_string(), "generic");
    }

    #[test]
    fn record_parses_wire_shape() {
        let record: ErrorContextRecord = serde_json::from_value(json!({
            "errorType": "plugin",
            "isCataloged": true,
            "message": "boom",
            "pluginName": "p"
        }))
        .unwrap();
        assert_eq!(record.error_type, ErrorType::Plugin);
        assert_eq!(record.plugin_name.as_deref(), Some("p"));
        assert!(record.category.is_none());
    }
}
