//! Prometheus metrics for ebworker.
//!
//! # Standard Metrics
//!
//! | Metric | Type | Labels | Description |
//! |--------|------|--------|-------------|
//! | `ebworker_dispatches_total` | Counter | `message`, `outcome` | Dispatched deliveries |
//! | `ebworker_dispatch_duration_seconds` | Histogram | `message` | Dispatch latency |
//!
//! # Example
//!
//! ```rust,ignore
//! use ebworker_telemetry::metrics::{record_dispatch, DispatchOutcome};
//!
//! record_dispatch("user.registered", DispatchOutcome::Completed, Duration::from_millis(45));
//! ```

use crate::error::TelemetryError;
use crate::TelemetryResult;
use metrics::{counter, describe_counter, describe_histogram, histogram};
use metrics_exporter_prometheus::{Matcher, PrometheusBuilder, PrometheusHandle};
use std::fmt;
use std::sync::OnceLock;
use std::time::Duration;

/// Counter of dispatched deliveries.
pub const DISPATCHES_TOTAL: &str = "ebworker_dispatches_total";

/// Histogram of dispatch durations.
pub const DISPATCH_DURATION_SECONDS: &str = "ebworker_dispatch_duration_seconds";

/// Global metrics handle for rendering.
static METRICS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

/// Metrics configuration.
#[derive(Debug, Clone)]
pub struct MetricsConfig {
    /// Whether metrics are enabled.
    pub enabled: bool,

    /// Histogram buckets for dispatch duration, in seconds.
    pub duration_buckets: Vec<f64>,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            // 1ms, 5ms, 10ms, 25ms, 50ms, 100ms, 250ms, 500ms, 1s, 2.5s, 5s, 10s, 30s
            duration_buckets: vec![
                0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0,
            ],
        }
    }
}

/// How a dispatch ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// The chain returned a response.
    Completed,
    /// The delivery could not be routed: its body was unreadable or its
    /// mapping was missing or badly typed. Nothing ran.
    Rejected,
    /// Resolution or a mapped middleware failed.
    Failed,
}

impl DispatchOutcome {
    /// Returns the label value for this outcome.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Completed => "completed",
            Self::Rejected => "rejected",
            Self::Failed => "failed",
        }
    }
}

impl fmt::Display for DispatchOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Initializes the metrics subsystem.
///
/// Installs a global Prometheus recorder. The host exposes the output of
/// [`render_metrics`] on whatever endpoint it already serves.
///
/// # Errors
///
/// Returns `TelemetryError::MetricsInit` if the buckets are invalid or a
/// recorder is already installed.
pub fn init_metrics(config: &MetricsConfig) -> TelemetryResult<()> {
    if !config.enabled {
        return Ok(());
    }

    let handle = PrometheusBuilder::new()
        .set_buckets_for_metric(
            Matcher::Full(DISPATCH_DURATION_SECONDS.to_string()),
            &config.duration_buckets,
        )
        .map_err(|e| TelemetryError::MetricsInit(e.to_string()))?
        .install_recorder()
        .map_err(|e| TelemetryError::MetricsInit(e.to_string()))?;

    let _ = METRICS_HANDLE.set(handle);

    register_metric_descriptions();

    Ok(())
}

/// Renders metrics in Prometheus format.
///
/// Returns `None` if metrics are not initialized.
#[must_use]
pub fn render_metrics() -> Option<String> {
    METRICS_HANDLE.get().map(PrometheusHandle::render)
}

fn register_metric_descriptions() {
    describe_counter!(DISPATCHES_TOTAL, "Total number of dispatched deliveries");
    describe_histogram!(
        DISPATCH_DURATION_SECONDS,
        "Delivery dispatch duration in seconds"
    );
}

/// Records a finished dispatch.
///
/// Updates the following metrics:
/// - `ebworker_dispatches_total` (incremented)
/// - `ebworker_dispatch_duration_seconds` (histogram observation)
pub fn record_dispatch(message_name: &str, outcome: DispatchOutcome, duration: Duration) {
    counter!(
        DISPATCHES_TOTAL,
        "message" => message_name.to_string(),
        "outcome" => outcome.as_str()
    )
    .increment(1);

    histogram!(
        DISPATCH_DURATION_SECONDS,
        "message" => message_name.to_string()
    )
    .record(duration.as_secs_f64());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = MetricsConfig::default();
        assert!(config.enabled);
        assert!(!config.duration_buckets.is_empty());
    }

    #[test]
    fn test_outcome_labels() {
        assert_eq!(DispatchOutcome::Completed.as_str(), "completed");
        assert_eq!(DispatchOutcome::Rejected.as_str(), "rejected");
        assert_eq!(DispatchOutcome::Failed.to_string(), "failed");
    }

    #[test]
    fn test_record_without_recorder() {
        // No-op without an installed recorder
        record_dispatch("message-name", DispatchOutcome::Completed, Duration::from_millis(10));
    }

    #[test]
    fn test_record_dispatch_renders() {
        let recorder = PrometheusBuilder::new().build_recorder();
        let handle = recorder.handle();

        metrics::with_local_recorder(&recorder, || {
            record_dispatch("message-name", DispatchOutcome::Completed, Duration::from_millis(5));
            record_dispatch("message-name", DispatchOutcome::Failed, Duration::from_millis(7));
        });

        let rendered = handle.render();
        assert!(rendered.contains(DISPATCHES_TOTAL));
        assert!(rendered.contains(r#"message="message-name""#));
        assert!(rendered.contains(r#"outcome="completed""#));
        assert!(rendered.contains(r#"outcome="failed""#));
        assert!(rendered.contains(DISPATCH_DURATION_SECONDS));
    }

    #[test]
    fn test_disabled_metrics() {
        let config = MetricsConfig {
            enabled: false,
            ..MetricsConfig::default()
        };
        assert!(init_metrics(&config).is_ok());
    }
}
