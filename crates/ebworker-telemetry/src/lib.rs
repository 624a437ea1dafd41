//! Observability for ebworker.
//!
//! This crate provides the logging and metrics used by the dispatch shim:
//!
//! - **Logging**: Structured JSON (or pretty) logs via `tracing-subscriber`
//! - **Metrics**: Prometheus-format metrics via the `metrics` crate
//!
//! # Standard Metrics
//!
//! | Metric | Type | Labels | Description |
//! |--------|------|--------|-------------|
//! | `ebworker_dispatches_total` | Counter | `message`, `outcome` | Dispatched deliveries |
//! | `ebworker_dispatch_duration_seconds` | Histogram | `message` | Dispatch latency |
//!
//! Recording is a no-op until a recorder is installed, so libraries can
//! record unconditionally and leave installation to the host.
//!
//! # Example
//!
//! ```rust,ignore
//! use ebworker_telemetry::{init_telemetry, LogConfig, MetricsConfig};
//!
//! init_telemetry(&LogConfig::production(), &MetricsConfig::default())?;
//!
//! // Later, from the host's /metrics endpoint:
//! let body = ebworker_telemetry::render_metrics().unwrap_or_default();
//! ```

#![doc(html_root_url = "https://docs.rs/ebworker-telemetry/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod error;
pub mod logging;
pub mod metrics;

pub use error::TelemetryError;
pub use logging::{create_env_filter, init_logging, LogConfig, LogFormat};
pub use metrics::{init_metrics, record_dispatch, render_metrics, DispatchOutcome, MetricsConfig};

/// Result type for telemetry operations.
pub type TelemetryResult<T> = Result<T, TelemetryError>;

/// Initializes logging, then metrics.
///
/// # Errors
///
/// Returns `TelemetryError` if either subsystem fails to initialize.
pub fn init_telemetry(logging: &LogConfig, metrics: &MetricsConfig) -> TelemetryResult<()> {
    init_logging(logging)?;
    init_metrics(metrics)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_telemetry_disabled() {
        let logging = LogConfig {
            enabled: false,
            ..LogConfig::default()
        };
        let metrics = MetricsConfig {
            enabled: false,
            ..MetricsConfig::default()
        };

        assert!(init_telemetry(&logging, &metrics).is_ok());
    }
}
