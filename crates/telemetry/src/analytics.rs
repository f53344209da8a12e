//! Analytics clients — the concrete [`AnalyticsClient`] implementations.
//!
//! [`Analytics`] stamps events with the client identity, classifies failures
//! and hands everything to a [`Transport`]. [`NoopAnalytics`] is used when
//! analytics are turned off.

use crate::TelemetryError;
use crate::classifier::ErrorClassifier;
use crate::client::{AbortAnalytics, AnalyticsClient, PendingHit, TaskKind};
use crate::transport::{AnalyticsEvent, ErrorReport, LogTransport, TaskHit, Transport, UserType};
use async_trait::async_trait;
use chrono::Utc;
use smelter_config::AnalyticsConfig;
use smelter_core::{ErrorCatalog, Failure};
use std::sync::Arc;
use tokio::runtime::Handle;
use tracing::{debug, warn};
use uuid::Uuid;

/// Analytics client delivering through a transport.
pub struct Analytics<T: Transport> {
    client_id: String,
    user_type: UserType,
    tool_version: String,
    classifier: ErrorClassifier,
    transport: Arc<T>,
}

impl<T: Transport + 'static> Analytics<T> {
    /// Create a client. The user type is detected from the environment.
    pub fn new(
        client_id: impl Into<String>,
        tool_version: impl Into<String>,
        catalog: Arc<ErrorCatalog>,
        transport: Arc<T>,
    ) -> Self {
        Self {
            client_id: client_id.into(),
            user_type: UserType::detect(),
            tool_version: tool_version.into(),
            classifier: ErrorClassifier::new(catalog),
            transport,
        }
    }

    /// Create a client from configuration. Without a configured client id a
    /// random one is generated for this process.
    pub fn from_config(
        config: &AnalyticsConfig,
        catalog: Arc<ErrorCatalog>,
        transport: Arc<T>,
    ) -> Self {
        let client_id = config
            .client_id
            .clone()
            .unwrap_or_else(|| Uuid::new_v4().to_string());
        Self::new(client_id, config.tool_version.clone(), catalog, transport)
    }

    /// Override the detected user type.
    pub fn with_user_type(mut self, user_type: UserType) -> Self {
        self.user_type = user_type;
        self
    }

    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    pub fn user_type(&self) -> UserType {
        self.user_type
    }

    pub fn classifier(&self) -> &ErrorClassifier {
        &self.classifier
    }

    pub fn transport(&self) -> &Arc<T> {
        &self.transport
    }

    fn task_hit(&self, kind: TaskKind, name: &str) -> TaskHit {
        TaskHit {
            client_id: self.client_id.clone(),
            kind,
            name: name.to_string(),
            user_type: self.user_type,
            tool_version: self.tool_version.clone(),
            timestamp: Utc::now(),
        }
    }

    /// Build the report for `failure`, or `None` if its descriptor opts out
    /// of reporting.
    ///
    /// A catalog error unknown to this client's catalog is
    /// [`TelemetryError::UnknownErrorId`].
    pub fn error_report(&self, failure: &Failure) -> Result<Option<ErrorReport>, TelemetryError> {
        if let Failure::Catalog(e) = failure
            && !e.descriptor.should_be_reported
        {
            return Ok(None);
        }
        let context = self.classifier.try_contextualize(failure)?;
        Ok(Some(ErrorReport {
            client_id: self.client_id.clone(),
            user_type: self.user_type,
            tool_version: self.tool_version.clone(),
            timestamp: Utc::now(),
            context: context.to_record(),
        }))
    }
}

#[async_trait]
impl<T: Transport + 'static> AnalyticsClient for Analytics<T> {
    /// Outside a Tokio runtime the hit is not sent and resolves to
    /// [`TelemetryError::NoRuntime`].
    fn send_task_hit(&self, kind: TaskKind, name: &str) -> (AbortAnalytics, PendingHit) {
        let abort = AbortAnalytics::new();
        let runtime = match Handle::try_current() {
            Ok(runtime) => runtime,
            Err(e) => {
                warn!(task = name, error = %e, "No async runtime, task hit dropped");
                return (abort, PendingHit::ready(Err(TelemetryError::NoRuntime)));
            }
        };
        let hit = self.task_hit(kind, name);
        let transport = Arc::clone(&self.transport);
        let aborted = abort.clone();

        let handle = runtime.spawn(async move {
            if aborted.is_aborted() {
                debug!(task = %hit.name, "Task hit aborted before delivery");
                return Ok(());
            }
            let task = hit.name.clone();
            transport
                .deliver(AnalyticsEvent::TaskHit(hit))
                .await
                .inspect_err(|e| warn!(task = %task, error = %e, "Failed to send task hit"))
        });

        let pending = PendingHit::new(async move {
            match handle.await {
                Ok(result) => result,
                Err(e) => Err(TelemetryError::TaskJoin(e.to_string())),
            }
        });

        (abort, pending)
    }

    async fn send_error_report(&self, failure: &Failure) -> Result<(), TelemetryError> {
        let report = self
            .error_report(failure)
            .inspect_err(|e| warn!(error = %e, "Failed to classify error"))?;
        let Some(report) = report else {
            debug!(error = failure.message(), "Error is not reported");
            return Ok(());
        };

        debug!(
            error_type = %report.context.error_type,
            transport = self.transport.name(),
            "Sending error report"
        );
        self.transport
            .deliver(AnalyticsEvent::ErrorReport(report))
            .await
            .inspect_err(|e| warn!(error = %e, "Failed to send error report"))
    }
}

/// Analytics client that drops everything.
#[derive(Debug, Default)]
pub struct NoopAnalytics;

#[async_trait]
impl AnalyticsClient for NoopAnalytics {
    fn send_task_hit(&self, _kind: TaskKind, _name: &str) -> (AbortAnalytics, PendingHit) {
        (AbortAnalytics::new(), PendingHit::ready(Ok(())))
    }

    async fn send_error_report(&self, _failure: &Failure) -> Result<(), TelemetryError> {
        Ok(())
    }
}

/// Build the client configured by `config`: [`NoopAnalytics`] when disabled,
/// otherwise [`Analytics`] over a [`LogTransport`].
pub fn client_from_config(
    config: &AnalyticsConfig,
    catalog: Arc<ErrorCatalog>,
) -> Box<dyn AnalyticsClient> {
    if !config.enabled {
        debug!("Analytics disabled");
        return Box::new(NoopAnalytics);
    }
    Box::new(Analytics::from_config(
        config,
        catalog,
        Arc::new(LogTransport),
    ))
}
