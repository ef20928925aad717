//! Prometheus metrics for the preconfirmation path.
//!
//! All metrics follow the naming convention: `qc_<subsystem>_<metric>_<unit>`

use lazy_static::lazy_static;
use prometheus::{
    exponential_buckets, Counter, CounterVec, Encoder, Histogram, HistogramOpts, Opts, Registry,
    TextEncoder,
};
use std::sync::Arc;

use crate::TelemetryError;

lazy_static! {
    /// Global metrics registry
    pub static ref REGISTRY: Registry = Registry::new();

    /// Terminal preconf verdicts by status
    pub static ref PRECONF_OUTCOMES: CounterVec = CounterVec::new(
        Opts::new("qc_preconf_outcomes_total", "Preconfirmation verdicts"),
        &["status"]  // status: confirmed/failed/not_evaluated
    ).expect("metric creation failed");

    /// Submissions that never produced a verdict
    pub static ref PRECONF_REJECTIONS: CounterVec = CounterVec::new(
        Opts::new("qc_preconf_rejections_total", "Preconfirmation requests without a verdict"),
        &["kind"]  // kind: validation/infrastructure/internal/timeout/not_ready
    ).expect("metric creation failed");

    /// Time from submission to verdict
    pub static ref PRECONF_EVALUATION_DURATION: Histogram = Histogram::with_opts(
        HistogramOpts::new(
            "qc_preconf_evaluation_duration_seconds",
            "Time spent evaluating a preconfirmation"
        ).buckets(exponential_buckets(0.0001, 2.0, 14).expect("valid buckets"))
    ).expect("metric creation failed");

    /// Gas refunded across evaluated transactions
    pub static ref PRECONF_REFUND_GAS: Counter = Counter::new(
        "qc_preconf_refund_gas_total",
        "Gas refunded across evaluated transactions"
    ).expect("metric creation failed");
}

/// Handle for the registered metrics
pub struct MetricsHandle {
    _registry: Arc<Registry>,
}

/// Register all metrics with the global registry.
pub fn register_metrics() -> Result<MetricsHandle, TelemetryError> {
    let metrics: Vec<Box<dyn prometheus::core::Collector>> = vec![
        Box::new(PRECONF_OUTCOMES.clone()),
        Box::new(PRECONF_REJECTIONS.clone()),
        Box::new(PRECONF_EVALUATION_DURATION.clone()),
        Box::new(PRECONF_REFUND_GAS.clone()),
    ];

    for metric in metrics {
        REGISTRY
            .register(metric)
            .map_err(|e| TelemetryError::MetricsInit(e.to_string()))?;
    }

    Ok(MetricsHandle {
        _registry: Arc::new(REGISTRY.clone()),
    })
}

/// Encode all metrics as Prometheus text format.
pub fn encode_metrics() -> Result<String, TelemetryError> {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();
    encoder
        .encode(&metric_families, &mut buffer)
        .map_err(|e| TelemetryError::MetricsInit(e.to_string()))?;
    String::from_utf8(buffer).map_err(|e| TelemetryError::MetricsInit(e.to_string()))
}
