//! Metrics helper structs for convenient metric recording

use prometheus::{Encoder, TextEncoder};

use super::{
    EXPORTS_TOTAL, EXPORT_SIZE_BYTES, HTTP_REQUESTS_TOTAL, HTTP_REQUEST_LATENCY, LLM_ERRORS_TOTAL,
    LLM_REQUESTS_TOTAL, LLM_REQUEST_LATENCY, PROJECTS_ACTIVE, SESSIONS_ACTIVE,
    SESSIONS_CREATED_TOTAL, SESSIONS_DELETED_TOTAL, SESSIONS_EVICTED_TOTAL, STEPS_COMPLETED_TOTAL,
    TEMPLATE_CACHE_HITS_TOTAL, TEMPLATE_CACHE_MISSES_TOTAL, TEMPLATE_INVALIDATIONS_TOTAL,
    TEMPLATE_RENDERS_TOTAL,
};

/// Encode all metrics to Prometheus text format
pub fn encode_metrics() -> Result<String, prometheus::Error> {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();
    encoder.encode(&metric_families, &mut buffer)?;
    Ok(String::from_utf8(buffer).unwrap_or_default())
}

/// Helper struct for recording template metrics
pub struct TemplateMetrics;

impl TemplateMetrics {
    pub fn record_cache_hit() {
        TEMPLATE_CACHE_HITS_TOTAL.inc();
    }

    pub fn record_cache_miss() {
        TEMPLATE_CACHE_MISSES_TOTAL.inc();
    }

    pub fn record_invalidation() {
        TEMPLATE_INVALIDATIONS_TOTAL.inc();
    }

    /// Record a successful render of `name`
    pub fn record_render(name: &str) {
        TEMPLATE_RENDERS_TOTAL.with_label_values(&[name]).inc();
    }
}

/// Helper struct for recording LLM call metrics
pub struct LlmMetrics;

impl LlmMetrics {
    /// Record a completed call
    pub fn record_success(operation: &str, duration_secs: f64) {
        LLM_REQUESTS_TOTAL
            .with_label_values(&[operation, "success"])
            .inc();
        LLM_REQUEST_LATENCY
            .with_label_values(&[operation])
            .observe(duration_secs);
    }

    /// Record a failed call with its error kind
    pub fn record_failure(operation: &str, kind: &str, duration_secs: f64) {
        LLM_REQUESTS_TOTAL
            .with_label_values(&[operation, "error"])
            .inc();
        LLM_ERRORS_TOTAL.with_label_values(&[kind]).inc();
        LLM_REQUEST_LATENCY
            .with_label_values(&[operation])
            .observe(duration_secs);
    }
}

/// Helper struct for session lifecycle metrics
pub struct SessionMetrics;

impl SessionMetrics {
    pub fn record_created() {
        SESSIONS_CREATED_TOTAL.inc();
        SESSIONS_ACTIVE.inc();
    }

    pub fn record_deleted() {
        SESSIONS_DELETED_TOTAL.inc();
        SESSIONS_ACTIVE.dec();
    }

    /// Record sessions removed by the cleanup task
    pub fn record_evicted(count: usize) {
        SESSIONS_EVICTED_TOTAL.inc_by(count as u64);
        SESSIONS_ACTIVE.sub(count as i64);
    }
}

/// Helper struct for legacy project metrics
pub struct ProjectMetrics;

impl ProjectMetrics {
    pub fn record_created() {
        PROJECTS_ACTIVE.inc();
    }

    pub fn record_deleted() {
        PROJECTS_ACTIVE.dec();
    }

    pub fn record_step_completed() {
        STEPS_COMPLETED_TOTAL.inc();
    }
}

/// Helper struct for export metrics
pub struct ExportMetrics;

impl ExportMetrics {
    /// Record a built archive
    pub fn record_success(size_bytes: usize) {
        EXPORTS_TOTAL.with_label_values(&["success"]).inc();
        EXPORT_SIZE_BYTES.observe(size_bytes as f64);
    }

    pub fn record_failure() {
        EXPORTS_TOTAL.with_label_values(&["error"]).inc();
    }
}

/// Helper struct for HTTP API metrics
pub struct HttpMetrics;

impl HttpMetrics {
    /// Record a finished request
    pub fn record_request(method: &str, path: &str, status: u16, duration_secs: f64) {
        let status = status.to_string();
        HTTP_REQUESTS_TOTAL
            .with_label_values(&[method, path, status.as_str()])
            .inc();
        HTTP_REQUEST_LATENCY
            .with_label_values(&[method, path])
            .observe(duration_secs);
    }
}
