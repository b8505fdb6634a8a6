use prometheus::{
    register_histogram_vec, register_int_counter, register_int_counter_vec, Encoder,
    HistogramVec, IntCounter, IntCounterVec, TextEncoder,
};
use std::sync::LazyLock;

pub static WEBHOOK_REQUESTS: LazyLock<IntCounterVec> = LazyLock::new(|| {
    register_int_counter_vec!(
        "sbp_provider_webhook_total",
        "Invoice webhook callbacks by outcome",
        &["result"]
    )
    .unwrap()
});

pub static SIGNATURE_FAILURES: LazyLock<IntCounter> = LazyLock::new(|| {
    register_int_counter!(
        "sbp_provider_signature_failures_total",
        "Webhook callbacks whose sbp-sig did not match"
    )
    .unwrap()
});

pub static OUTBOUND_REQUESTS: LazyLock<IntCounterVec> = LazyLock::new(|| {
    register_int_counter_vec!(
        "sbp_provider_outbound_total",
        "Provider operations calling out to SBP or Wix",
        &["operation", "result"]
    )
    .unwrap()
});

pub static OUTBOUND_LATENCY: LazyLock<HistogramVec> = LazyLock::new(|| {
    register_histogram_vec!(
        "sbp_provider_outbound_duration_seconds",
        "Provider operation latency in seconds",
        &["operation"],
        vec![0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0]
    )
    .unwrap()
});

/// Count one provider operation and its latency.
pub fn record_outbound(operation: &str, success: bool, started: std::time::Instant) {
    let result = if success { "success" } else { "error" };
    OUTBOUND_REQUESTS
        .with_label_values(&[operation, result])
        .inc();
    OUTBOUND_LATENCY
        .with_label_values(&[operation])
        .observe(started.elapsed().as_secs_f64());
}

pub fn metrics_output() -> String {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();
    if encoder.encode(&metric_families, &mut buffer).is_err() {
        return String::new();
    }
    String::from_utf8(buffer).unwrap_or_default()
}
