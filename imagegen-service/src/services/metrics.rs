//! Prometheus metrics for imagegen-service.

use prometheus::{Encoder, HistogramVec, IntCounterVec, Opts, Registry, TextEncoder};
use std::sync::OnceLock;

// Global registry
pub static REGISTRY: OnceLock<Registry> = OnceLock::new();

// Metrics
pub static GENERATION_REQUESTS_TOTAL: OnceLock<IntCounterVec> = OnceLock::new();
pub static GENERATION_DURATION_SECONDS: OnceLock<HistogramVec> = OnceLock::new();

/// Initialize all metrics. Safe to call more than once; the first call wins.
pub fn init_metrics() {
    let registry = Registry::new();

    let requests_total = IntCounterVec::new(
        Opts::new(
            "imagegen_requests_total",
            "Total number of image generation requests",
        ),
        &["status"],
    )
    .expect("metric can be created");

    let generation_duration = HistogramVec::new(
        prometheus::HistogramOpts::new(
            "imagegen_generation_duration_seconds",
            "End-to-end duration of an image set generation in seconds",
        )
        .buckets(vec![0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0, 60.0]),
        &["status"],
    )
    .expect("metric can be created");

    let registered = registry
        .register(Box::new(requests_total.clone()))
        .and_then(|_| registry.register(Box::new(generation_duration.clone())));
    if registered.is_err() {
        return;
    }

    // Initialize globals
    let _ = REGISTRY.set(registry);
    let _ = GENERATION_REQUESTS_TOTAL.set(requests_total);
    let _ = GENERATION_DURATION_SECONDS.set(generation_duration);
}

/// Count one generation request with the given outcome.
pub fn record_generation(status: &str) {
    if let Some(counter) = GENERATION_REQUESTS_TOTAL.get() {
        counter.with_label_values(&[status]).inc();
    }
}

/// Record the wall-clock duration of a generation batch.
pub fn observe_generation_seconds(status: &str, seconds: f64) {
    if let Some(histogram) = GENERATION_DURATION_SECONDS.get() {
        histogram.with_label_values(&[status]).observe(seconds);
    }
}

/// Render the registry in Prometheus text exposition format.
pub fn get_metrics() -> String {
    let Some(registry) = REGISTRY.get() else {
        return String::new();
    };

    let mut buffer = Vec::new();
    let encoder = TextEncoder::new();
    let metric_families = registry.gather();
    if encoder.encode(&metric_families, &mut buffer).is_err() {
        return String::new();
    }
    String::from_utf8(buffer).unwrap_or_default()
}
