//! Analytics client contract.
//!
//! Two fire-and-forget operations: ping that a task ran, and report a caught
//! failure. Calls are independent and unordered; nothing here retries.

use crate::TelemetryError;
use async_trait::async_trait;
use futures::future::BoxFuture;
use serde::{Deserialize, Serialize};
use smelter_core::Failure;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::task::{Context, Poll};

/// Whether a task ships with Smelter or was defined by the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskKind {
    Builtin,
    Custom,
}

impl std::fmt::Display for TaskKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Builtin => write!(f, "builtin"),
            Self::Custom => write!(f, "custom"),
        }
    }
}

/// Advisory cancel handle for a pending task hit.
///
/// Aborting before the hit is handed to the transport suppresses it. A hit
/// that is already being delivered is not recalled.
#[derive(Debug, Clone, Default)]
pub struct AbortAnalytics {
    aborted: Arc<AtomicBool>,
}

impl AbortAnalytics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn abort(&self) {
        self.aborted.store(true, Ordering::SeqCst);
    }

    pub fn is_aborted(&self) -> bool {
        self.aborted.load(Ordering::SeqCst)
    }
}

/// Completion of a task hit.
///
/// Resolves once the hit was delivered, suppressed by an abort, or failed in
/// the transport. Dropping it does not cancel the hit.
pub struct PendingHit {
    inner: BoxFuture<'static, Result<(), TelemetryError>>,
}

impl PendingHit {
    pub fn new<F>(future: F) -> Self
    where
        F: Future<Output = Result<(), TelemetryError>> + Send + 'static,
    {
        Self {
            inner: Box::pin(future),
        }
    }

    /// An already-completed hit.
    pub fn ready(result: Result<(), TelemetryError>) -> Self {
        Self::new(futures::future::ready(result))
    }
}

impl Future for PendingHit {
    type Output = Result<(), TelemetryError>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        self.inner.as_mut().poll(cx)
    }
}

impl std::fmt::Debug for PendingHit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PendingHit").finish_non_exhaustive()
    }
}

/// The analytics surface used by the task runner.
#[async_trait]
pub trait AnalyticsClient: Send + Sync {
    /// Record that a task was invoked.
    ///
    /// Returns immediately; the hit is sent in the background.
    /// Implementations must not panic when no async runtime is available;
    /// the returned [`PendingHit`] reports the failure instead.
    fn send_task_hit(&self, kind: TaskKind, name: &str) -> (AbortAnalytics, PendingHit);

    /// Classify `failure` and deliver the resulting error context.
    ///
    /// An unattributed catalog error whose descriptor has
    /// `should_be_reported = false` is skipped and resolves to `Ok(())`.
    /// Plugin and generic failures are always delivered.
    async fn send_error_report(&self, failure: &Failure) -> Result<(), TelemetryError>;
}
