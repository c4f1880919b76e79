use lazy_static::lazy_static;
use prometheus::{
    register_histogram_vec, register_int_counter_vec, register_int_gauge, HistogramVec,
    IntCounterVec, IntGauge,
};

/// Code label for error responses whose code is neither registered nor
/// configured, so client-chosen codes cannot grow the series count
pub const OTHER_CODE_LABEL: &str = "other";

lazy_static! {
    // HTTP Metrics
    pub static ref HTTP_REQUESTS_TOTAL: IntCounterVec = register_int_counter_vec!(
        "http_requests_total",
        "Total HTTP requests",
        &["method", "route", "status"]
    )
    .unwrap();

    pub static ref HTTP_REQUEST_DURATION_SECONDS: HistogramVec = register_histogram_vec!(
        "http_request_duration_seconds",
        "HTTP request duration in seconds",
        &["method", "route"],
        vec![0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0]
    )
    .unwrap();

    // Error response metrics
    pub static ref ERROR_RESPONSES_TOTAL: IntCounterVec = register_int_counter_vec!(
        "error_responses_total",
        "Total error responses assembled",
        &["status", "code"]
    )
    .unwrap();

    pub static ref ERROR_MESSAGES_REGISTERED: IntGauge = register_int_gauge!(
        "error_messages_registered",
        "Number of error codes with a registered message"
    )
    .unwrap();

    pub static ref EXCEPTION_MAPPINGS_CONFIGURED: IntGauge = register_int_gauge!(
        "exception_mappings_configured",
        "Number of raised-error types with a configured mapping"
    )
    .unwrap();
}

/// Initialize all metrics (called on startup)
pub fn init_metrics() {
    // Force lazy_static initialization
    lazy_static::initialize(&HTTP_REQUESTS_TOTAL);
    lazy_static::initialize(&HTTP_REQUEST_DURATION_SECONDS);
    lazy_static::initialize(&ERROR_RESPONSES_TOTAL);
    lazy_static::initialize(&ERROR_MESSAGES_REGISTERED);
    lazy_static::initialize(&EXCEPTION_MAPPINGS_CONFIGURED);
}
