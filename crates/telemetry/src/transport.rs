//! Analytics events and the transports that deliver them.
//!
//! A [`Transport`] is the boundary to whatever actually ships events
//! somewhere. The transports in this module stay in-process: one writes
//! events to the log, one records them in memory.

use crate::TelemetryError;
use crate::client::TaskKind;
use crate::context::ErrorContextRecord;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::{debug, info};

/// Environment variables whose presence marks a CI run.
const CI_ENV_VARS: &[&str] = &[
    "CI",
    "CONTINUOUS_INTEGRATION",
    "BUILD_NUMBER",
    "GITHUB_ACTIONS",
    "GITLAB_CI",
];

/// Who is running Smelter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserType {
    Ci,
    Developer,
}

impl UserType {
    /// Detect from the process environment.
    pub fn detect() -> Self {
        Self::from_env(|key| std::env::var(key).ok())
    }

    /// Detect using `lookup` to read environment variables.
    pub fn from_env(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let is_ci = CI_ENV_VARS.iter().any(|key| {
            lookup(key).is_some_and(|v| !v.is_empty() && v != "0" && !v.eq_ignore_ascii_case("false"))
        });
        if is_ci { Self::Ci } else { Self::Developer }
    }
}

/// A task invocation ping.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskHit {
    pub client_id: String,
    pub kind: TaskKind,
    /// Task name, e.g. "compile".
    pub name: String,
    pub user_type: UserType,
    pub tool_version: String,
    pub timestamp: DateTime<Utc>,
}

/// A classified failure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorReport {
    pub client_id: String,
    pub user_type: UserType,
    pub tool_version: String,
    pub timestamp: DateTime<Utc>,
    pub context: ErrorContextRecord,
}

/// Everything a transport can be asked to deliver.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AnalyticsEvent {
    TaskHit(TaskHit),
    ErrorReport(ErrorReport),
}

impl AnalyticsEvent {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::TaskHit(_) => "task_hit",
            Self::ErrorReport(_) => "error_report",
        }
    }
}

/// Delivers analytics events.
///
/// Timeouts, retries and batching, if any, belong to the implementation.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &str;

    async fn deliver(&self, event: AnalyticsEvent) -> Result<(), TelemetryError>;
}

/// Writes each event to the log as JSON.
#[derive(Debug, Default)]
pub struct LogTransport;

#[async_trait]
impl Transport for LogTransport {
    fn name(&self) -> &str {
        "log"
    }

    async fn deliver(&self, event: AnalyticsEvent) -> Result<(), TelemetryError> {
        let payload = serde_json::to_string(&event)?;
        info!(target: "smelter::analytics", kind = event.kind(), %payload, "Analytics event");
        Ok(())
    }
}

/// Keeps delivered events in memory.
///
/// Can be switched into a failing mode to exercise transport errors.
#[derive(Debug, Default)]
pub struct MemoryTransport {
    events: Mutex<Vec<AnalyticsEvent>>,
    failure: Mutex<Option<String>>,
}

impl MemoryTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail every delivery with `reason` until [`recover`](Self::recover).
    pub async fn fail_with(&self, reason: impl Into<String>) {
        *self.failure.lock().await = Some(reason.into());
    }

    pub async fn recover(&self) {
        *self.failure.lock().await = None;
    }

    /// Snapshot of the events delivered so far.
    pub async fn events(&self) -> Vec<AnalyticsEvent> {
        self.events.lock().await.clone()
    }

    pub async fn len(&self) -> usize {
        self.events.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.events.lock().await.is_empty()
    }

    pub async fn clear(&self) {
        self.events.lock().await.clear();
    }
}

#[async_trait]
impl Transport for MemoryTransport {
    fn name(&self) -> &str {
        "memory"
    }

    async fn deliver(&self, event: AnalyticsEvent) -> Result<(), TelemetryError> {
        if let Some(reason) = self.failure.lock().await.as_ref() {
            return Err(TelemetryError::Transport(reason.clone()));
        }
        debug!(kind = event.kind(), "Recorded analytics event");
        self.events.lock().await.push(event);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::ErrorType;
    use std::collections::HashMap;

    fn hit() -> AnalyticsEvent {
        AnalyticsEvent::TaskHit(TaskHit {
            client_id: "client-1".into(),
            kind: TaskKind::Builtin,
            name: "compile".into(),
            user_type: UserType::Developer,
            tool_version: "0.1.0".into(),
            timestamp: Utc::now(),
        })
    }

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn detects_ci() {
        assert_eq!(UserType::from_env(env(&[("CI", "true")])), UserType::Ci);
        assert_eq!(UserType::from_env(env(&[("GITHUB_ACTIONS", "1")])), UserType::Ci);
    }

    #[test]
    fn detects_developer() {
        assert_eq!(UserType::from_env(env(&[])), UserType::Developer);
        assert_eq!(UserType::from_env(env(&[("CI", "false")])), UserType::Developer);
        assert_eq!(UserType::from_env(env(&[("CI", "")])), UserType::Developer);
    }

    #[test]
    fn event_is_tagged_by_type() {
        let json = serde_json::to_value(hit()).unwrap();
        assert_eq!(json["type"], "task_hit");
        assert_eq!(json["kind"], "builtin");
        assert_eq!(json["name"], "compile");
        assert_eq!(json["clientId"], "client-1");
        assert_eq!(json["userType"], "developer");
    }

    #[test]
    fn error_report_embeds_flat_context() {
        let event = AnalyticsEvent::ErrorReport(ErrorReport {
            client_id: "c".into(),
            user_type: UserType::Ci,
            tool_version: "0.1.0".into(),
            timestamp: Utc::now(),
            context: crate::context::ErrorContext::Generic {
                message: "disk full".into(),
            }
            .to_record(),
        });
        assert_eq!(event.kind(), "error_report");
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "error_report");
        assert_eq!(json["context"]["errorType"], "generic");
        assert!(json["context"].get("pluginName").is_none());

        let parsed: AnalyticsEvent = serde_json::from_value(json).unwrap();
        match parsed {
            AnalyticsEvent::ErrorReport(r) => assert_eq!(r.context.error_type, ErrorType::Generic),
            other => panic!("expected error report, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn memory_transport_records_events() {
        let transport = MemoryTransport::new();
        assert!(transport.is_empty().await);
        transport.deliver(hit()).await.unwrap();
        transport.deliver(hit()).await.unwrap();
        assert_eq!(transport.len().await, 2);
        transport.clear().await;
        assert!(transport.is_empty().await);
    }

    #[tokio::test]
    async fn memory_transport_can_fail() {
        let transport = MemoryTransport::new();
        transport.fail_with("connection reset").await;
        let err = transport.deliver(hit()).await.unwrap_err();
        assert!(err.to_string().contains("connection reset"));
        assert!(transport.is_empty().await);

        transport.recover().await;
        assert!(transport.deliver(hit()).await.is_ok());
    }

    #[tokio::test]
    async fn log_transport_accepts_events() {
        assert_eq!(LogTransport.name(), "log");
        assert!(LogTransport.deliver(hit()).await.is_ok());
    }
}
