//! Telemetry configuration from environment variables.

use std::env;

/// Filter applied when neither `QC_LOG_LEVEL` nor `RUST_LOG` is set.
pub const DEFAULT_LOG_FILTER: &str = "info";

/// Configuration for logging and metrics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TelemetryConfig {
    /// Component name attached to the startup record.
    pub component: String,

    /// `EnvFilter` directive, e.g. `info,qc_18_preconfirmation=debug`
    pub log_filter: String,

    /// Emit JSON records instead of human-readable lines
    pub json_logs: bool,

    /// Emit a record when an instrumented span closes, with its busy time.
    /// Enables per-evaluation timings from the coordinator's evaluation span.
    pub span_events: bool,

    /// Register the preconf metrics in the global registry
    pub metrics_enabled: bool,
}

impl TelemetryConfig {
    /// Defaults for `component`.
    pub fn new(component: impl Into<String>) -> Self {
        Self {
            component: component.into(),
            log_filter: DEFAULT_LOG_FILTER.to_string(),
            json_logs: false,
            span_events: false,
            metrics_enabled: true,
        }
    }

    /// Create configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `QC_LOG_LEVEL` or `RUST_LOG`: filter directive (default: info)
    /// - `QC_JSON_LOGS`: JSON records (default: true inside a container)
    /// - `QC_SPAN_EVENTS`: span close records (default: false)
    /// - `QC_METRICS`: register metrics (default: true)
    pub fn from_env(component: impl Into<String>) -> Self {
        let in_container =
            env::var("KUBERNETES_SERVICE_HOST").is_ok() || env::var("DOCKER_CONTAINER").is_ok();
        let flag = |name: &str, default: bool| env::var(name).map_or(default, |v| parse_flag(&v));

        Self {
            log_filter: env::var("QC_LOG_LEVEL")
                .or_else(|_| env::var("RUST_LOG"))
                .unwrap_or_else(|_| DEFAULT_LOG_FILTER.to_string()),
            json_logs: flag("QC_JSON_LOGS", in_container),
            span_events: flag("QC_SPAN_EVENTS", false),
            metrics_enabled: flag("QC_METRICS", true),
            ..Self::new(component)
        }
    }
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self::new("quantum-chain")
    }
}

fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "true" | "1" | "yes" | "on"
    )
}
