use once_cell::sync::Lazy;
use prometheus::{
    opts, Encoder, HistogramOpts, HistogramVec, IntCounterVec, IntGauge, Registry, TextEncoder,
};

use crate::validation::{resolve_all, FailureKind, FieldFailure};

macro_rules! counter_vec {
    ($name:expr, $help:expr, $labels:expr) => {
        Lazy::new(|| IntCounterVec::new(opts!($name, $help), $labels).unwrap())
    };
}
macro_rules! histogram_vec {
    ($name:expr, $help:expr, $labels:expr) => {
        Lazy::new(|| {
            HistogramVec::new(HistogramOpts::new($name, $help).buckets(LATENCY_BUCKETS.to_vec()), $labels)
                .unwrap()
        })
    };
}
macro_rules! gauge {
    ($name:expr, $help:expr) => {
        Lazy::new(|| IntGauge::new($name, $help).unwrap())
    };
}

const LATENCY_BUCKETS: [f64; 10] = [0.0005, 0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0];

// ── HTTP ────────────────────────────────────────────────────────────────────
pub static HTTP_REQUESTS_TOTAL: Lazy<IntCounterVec> =
    counter_vec!("http_requests_total", "Total HTTP requests", &["method", "path", "status"]);
pub static HTTP_REQUEST_DURATION: Lazy<HistogramVec> =
    histogram_vec!("http_request_duration_seconds", "HTTP request latency", &["method", "path"]);

// ── Forms ───────────────────────────────────────────────────────────────────
pub static FORM_SUBMISSIONS: Lazy<IntCounterVec> = counter_vec!(
    "form_submissions_total",
    "Form submissions by outcome",
    &["form", "outcome"]
);
pub static VALIDATION_FAILURES: Lazy<IntCounterVec> = counter_vec!(
    "validation_failures_total",
    "Field validation failures",
    &["form", "field", "kind"]
);
pub static FORMS_REGISTERED: Lazy<IntGauge> = gauge!("forms_registered", "Registered form schemas");

// ── Sessions ────────────────────────────────────────────────────────────────
pub static SESSION_OPERATIONS: Lazy<IntCounterVec> =
    counter_vec!("session_operations_total", "Session store operations", &["op"]);
pub static SESSIONS_ISSUED: Lazy<IntCounterVec> =
    counter_vec!("sessions_issued_total", "New session identifiers issued", &["reason"]);

pub fn register_all(r: &Registry) -> prometheus::Result<()> {
    r.register(Box::new(HTTP_REQUESTS_TOTAL.clone()))?;
    r.register(Box::new(HTTP_REQUEST_DURATION.clone()))?;
    r.register(Box::new(FORM_SUBMISSIONS.clone()))?;
    r.register(Box::new(VALIDATION_FAILURES.clone()))?;
    r.register(Box::new(FORMS_REGISTERED.clone()))?;
    r.register(Box::new(SESSION_OPERATIONS.clone()))?;
    r.register(Box::new(SESSIONS_ISSUED.clone()))?;
    Ok(())
}

/// A prefixed registry with every metric registered.
pub fn new_registry(prefix: &str) -> prometheus::Result<Registry> {
    let registry = Registry::new_custom(Some(prefix.into()), None)?;
    register_all(&registry)?;
    Ok(registry)
}

pub fn gather_metrics(r: &Registry) -> String {
    let encoder = TextEncoder::new();
    let families = r.gather();
    let mut buf = Vec::new();
    encoder.encode(&families, &mut buf).unwrap_or_default();
    String::from_utf8(buf).unwrap_or_default()
}

pub fn observe_http(method: &str, path: &str, status: u16, duration_secs: f64) {
    HTTP_REQUESTS_TOTAL
        .with_label_values(&[method, path, &status.to_string()])
        .inc();
    HTTP_REQUEST_DURATION
        .with_label_values(&[method, path])
        .observe(duration_secs);
}

pub fn observe_submission(form: &str, failures: &[FieldFailure]) {
    let outcome = if failures.is_empty() { "accepted" } else { "rejected" };
    FORM_SUBMISSIONS.with_label_values(&[form, outcome]).inc();
    // Failures that fell back to "Invalid value" are counted under that kind.
    for failure in resolve_all(failures) {
        observe_failure(form, &failure.field_name, failure.kind);
    }
}

fn observe_failure(form: &str, field: &str, kind: FailureKind) {
    VALIDATION_FAILURES
        .with_label_values(&[form, field, kind.as_str()])
        .inc();
}
