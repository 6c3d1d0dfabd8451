//! Prometheus metrics for affiliate-service.

use once_cell::sync::Lazy;
use prometheus::{
    register_counter_vec, register_histogram_vec, CounterVec, Encoder, HistogramVec, TextEncoder,
};

/// Counter for HTTP requests by method, path, and status.
pub static HTTP_REQUESTS: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "affiliate_http_requests_total",
        "Total number of HTTP requests",
        &["method", "path", "status"]
    )
    .expect("Failed to register HTTP_REQUESTS")
});

/// Histogram for HTTP request duration by method and path.
pub static HTTP_REQUEST_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    register_histogram_vec!(
        "affiliate_http_request_duration_seconds",
        "HTTP request duration in seconds",
        &["method", "path"],
        vec![0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0]
    )
    .expect("Failed to register HTTP_REQUEST_DURATION")
});

/// Histogram for database query duration.
pub static DB_QUERY_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    register_histogram_vec!(
        "affiliate_db_query_duration_seconds",
        "Database query duration in seconds",
        &["operation"],
        vec![0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5]
    )
    .expect("Failed to register DB_QUERY_DURATION")
});

/// Counter for recorded click events.
pub static CLICK_EVENTS: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "affiliate_click_events_total",
        "Total number of click recording attempts",
        &["result"]
    )
    .expect("Failed to register CLICK_EVENTS")
});

/// Counter for coupon redemption attempts.
pub static COUPON_REDEMPTIONS: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "affiliate_coupon_redemptions_total",
        "Total number of coupon redemption attempts",
        &["outcome"]
    )
    .expect("Failed to register COUPON_REDEMPTIONS")
});

/// Counter for permission checks by decision.
pub static PERMISSION_CHECKS: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "affiliate_permission_checks_total",
        "Total number of permission checks",
        &["decision"]
    )
    .expect("Failed to register PERMISSION_CHECKS")
});

/// Counter for data visibility checks by decision.
pub static VISIBILITY_CHECKS: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "affiliate_visibility_checks_total",
        "Total number of data visibility checks",
        &["decision"]
    )
    .expect("Failed to register VISIBILITY_CHECKS")
});

/// Counter for two-factor verification attempts.
pub static TWO_FACTOR_VERIFICATIONS: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "affiliate_two_factor_verifications_total",
        "Total number of two-factor verification attempts",
        &["method", "outcome"]
    )
    .expect("Failed to register TWO_FACTOR_VERIFICATIONS")
});

/// Counter for errors.
pub static ERRORS: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "affiliate_errors_total",
        "Total number of errors",
        &["error_type"]
    )
    .expect("Failed to register ERRORS")
});

/// Initialize all metrics (forces lazy initialization).
pub fn init_metrics() {
    Lazy::force(&HTTP_REQUESTS);
    Lazy::force(&HTTP_REQUEST_DURATION);
    Lazy::force(&DB_QUERY_DURATION);
    Lazy::force(&CLICK_EVENTS);
    Lazy::force(&COUPON_REDEMPTIONS);
    Lazy::force(&PERMISSION_CHECKS);
    Lazy::force(&VISIBILITY_CHECKS);
    Lazy::force(&TWO_FACTOR_VERIFICATIONS);
    Lazy::force(&ERRORS);
}

/// Get all metrics as Prometheus text format.
pub fn get_metrics() -> String {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();
    encoder.encode(&metric_families, &mut buffer).unwrap();
    String::from_utf8(buffer).unwrap()
}

/// Record an HTTP request.
pub fn record_http_request(method: &str, path: &str, status: &str) {
    HTTP_REQUESTS
        .with_label_values(&[method, path, status])
        .inc();
}

/// Record HTTP request duration.
pub fn record_http_request_duration(method: &str, path: &str, duration_secs: f64) {
    HTTP_REQUEST_DURATION
        .with_label_values(&[method, path])
        .observe(duration_secs);
}

/// Record a click recording attempt.
pub fn record_click_event(result: &str) {
    CLICK_EVENTS.with_label_values(&[result]).inc();
}

/// Record a coupon redemption attempt.
pub fn record_coupon_redemption(outcome: &str) {
    COUPON_REDEMPTIONS.with_label_values(&[outcome]).inc();
}

/// Record a permission check decision.
pub fn record_permission_check(decision: &str) {
    PERMISSION_CHECKS.with_label_values(&[decision]).inc();
}

/// Record a data visibility check decision.
pub fn record_visibility_check(decision: &str) {
    VISIBILITY_CHECKS.with_label_values(&[decision]).inc();
}

/// Record a two-factor verification attempt.
pub fn record_two_factor_verification(method: &str, outcome: &str) {
    TWO_FACTOR_VERIFICATIONS
        .with_label_values(&[method, outcome])
        .inc();
}

/// Record an error.
pub fn record_error(error_type: &str) {
    ERRORS.with_label_values(&[error_type]).inc();
}
