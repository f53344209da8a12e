//! Error reporting and usage analytics for Smelter.
//!
//! Classifies caught failures against the error catalog into a flat
//! [`ErrorContextRecord`], and defines the [`AnalyticsClient`] contract
//! through which task hits and error reports leave the process.
//!
//! ```text
//! Failure ──▶ ErrorClassifier ──▶ ErrorContext ──▶ Transport
//!                  │
//!            ErrorCatalog (read-only)
//! ```

pub mod analytics;
pub mod classifier;
pub mod client;
pub mod context;
pub mod logging;
pub mod transport;

pub use analytics::{Analytics, NoopAnalytics, client_from_config};
pub use classifier::ErrorClassifier;
pub use client::{AbortAnalytics, AnalyticsClient, PendingHit, TaskKind};
pub use context::{ErrorContext, ErrorContextRecord, ErrorType};
pub use transport::{
    AnalyticsEvent, ErrorReport, LogTransport, MemoryTransport, TaskHit, Transport, UserType,
};

/// Errors from the telemetry subsystem.
#[derive(Debug, thiserror::Error)]
pub enum TelemetryError {
    #[error("error id {0} is not registered in the error catalog")]
    UnknownErrorId(u32),

    #[error("transport error: {0}")]
    Transport(String),

    #[error("no async runtime to send analytics from")]
    NoRuntime,

    #[error("analytics task failed: {0}")]
    TaskJoin(String),

    #[error("logging setup failed: {0}")]
    Logging(String),

    #[error("serialization error: {0}")]
    SerdeError(#[from] serde_json::Error),
}
