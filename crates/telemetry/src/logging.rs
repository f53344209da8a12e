//! Structured logging initialization.

use crate::TelemetryError;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Install the global tracing subscriber.
///
/// `RUST_LOG` takes precedence; otherwise the level is `debug` when
/// `verbose` is set and `info` if not. `SMELTER_LOG_FORMAT=json` switches
/// to JSON output.
pub fn init_logging(verbose: bool) -> Result<(), TelemetryError> {
    let filter = if verbose { "debug" } else { "info" };
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    let json = std::env::var("SMELTER_LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    let result = if json {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt::layer().json().with_current_span(true))
            .try_init()
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt::layer().with_target(false))
            .try_init()
    };

    result.map_err(|e| TelemetryError::Logging(e.to_string()))
}
