//! Prometheus metrics for the wizard backend.
//!
//! This module provides metrics for monitoring:
//! - Template cache (hits, misses, invalidations, renders)
//! - LLM calls (requests by operation and outcome, latency)
//! - Sessions and projects (active counts, lifecycle events)
//! - Export archives
//! - HTTP API

mod helpers;

pub use helpers::{
    encode_metrics, ExportMetrics, HttpMetrics, LlmMetrics, ProjectMetrics, SessionMetrics,
    TemplateMetrics,
};

use lazy_static::lazy_static;
use prometheus::{
    register_histogram, register_histogram_vec, register_int_counter, register_int_counter_vec,
    register_int_gauge, Histogram, HistogramVec, IntCounter, IntCounterVec, IntGauge,
};

/// Prefix for all metrics
const METRIC_PREFIX: &str = "vibe";

lazy_static! {
    // ============================================================================
    // Template Metrics
    // ============================================================================

    /// Template loads served from cache
    pub static ref TEMPLATE_CACHE_HITS_TOTAL: IntCounter = register_int_counter!(
        format!("{}_template_cache_hits_total", METRIC_PREFIX),
        "Total template loads served from cache"
    ).unwrap();

    /// Template loads that read the backing file
    pub static ref TEMPLATE_CACHE_MISSES_TOTAL: IntCounter = register_int_counter!(
        format!("{}_template_cache_misses_total", METRIC_PREFIX),
        "Total template loads that read the backing file"
    ).unwrap();

    /// Cache entries dropped by invalidation
    pub static ref TEMPLATE_INVALIDATIONS_TOTAL: IntCounter = register_int_counter!(
        format!("{}_template_invalidations_total", METRIC_PREFIX),
        "Total template cache entries invalidated"
    ).unwrap();

    /// Renders by template name
    pub static ref TEMPLATE_RENDERS_TOTAL: IntCounterVec = register_int_counter_vec!(
        format!("{}_template_renders_total", METRIC_PREFIX),
        "Total template renders",
        &["template"]
    ).unwrap();

    // ============================================================================
    // LLM Metrics
    // ============================================================================

    /// LLM requests by operation and outcome
    pub static ref LLM_REQUESTS_TOTAL: IntCounterVec = register_int_counter_vec!(
        format!("{}_llm_requests_total", METRIC_PREFIX),
        "Total LLM completion requests",
        &["operation", "status"]
    ).unwrap();

    /// LLM failures by error kind
    pub static ref LLM_ERRORS_TOTAL: IntCounterVec = register_int_counter_vec!(
        format!("{}_llm_errors_total", METRIC_PREFIX),
        "Total LLM errors by kind",
        &["kind"]
    ).unwrap();

    /// LLM request latency
    pub static ref LLM_REQUEST_LATENCY: HistogramVec = register_histogram_vec!(
        format!("{}_llm_request_latency_seconds", METRIC_PREFIX),
        "LLM request latency in seconds",
        &["operation"],
        vec![0.5, 1.0, 2.5, 5.0, 10.0, 30.0, 60.0, 120.0, 300.0]
    ).unwrap();

    // ============================================================================
    // Session Metrics
    // ============================================================================

    /// Sessions currently held in memory
    pub static ref SESSIONS_ACTIVE: IntGauge = register_int_gauge!(
        format!("{}_sessions_active", METRIC_PREFIX),
        "Number of wizard sessions in memory"
    ).unwrap();

    /// Sessions created
    pub static ref SESSIONS_CREATED_TOTAL: IntCounter = register_int_counter!(
        format!("{}_sessions_created_total", METRIC_PREFIX),
        "Total wizard sessions created"
    ).unwrap();

    /// Sessions deleted by clients
    pub static ref SESSIONS_DELETED_TOTAL: IntCounter = register_int_counter!(
        format!("{}_sessions_deleted_total", METRIC_PREFIX),
        "Total wizard sessions deleted"
    ).unwrap();

    /// Sessions evicted by the cleanup task
    pub static ref SESSIONS_EVICTED_TOTAL: IntCounter = register_int_counter!(
        format!("{}_sessions_evicted_total", METRIC_PREFIX),
        "Total wizard sessions evicted for age"
    ).unwrap();

    // ============================================================================
    // Project Metrics
    // ============================================================================

    /// Projects currently held in memory
    pub static ref PROJECTS_ACTIVE: IntGauge = register_int_gauge!(
        format!("{}_projects_active", METRIC_PREFIX),
        "Number of legacy projects in memory"
    ).unwrap();

    /// Steps marked completed
    pub static ref STEPS_COMPLETED_TOTAL: IntCounter = register_int_counter!(
        format!("{}_steps_completed_total", METRIC_PREFIX),
        "Total plan steps marked completed"
    ).unwrap();

    // ============================================================================
    // Export Metrics
    // ============================================================================

    /// Archives built
    pub static ref EXPORTS_TOTAL: IntCounterVec = register_int_counter_vec!(
        format!("{}_exports_total", METRIC_PREFIX),
        "Total session export attempts",
        &["status"]
    ).unwrap();

    /// Archive size
    pub static ref EXPORT_SIZE_BYTES: Histogram = register_histogram!(
        format!("{}_export_size_bytes", METRIC_PREFIX),
        "Size of exported archives in bytes",
        vec![1024.0, 4096.0, 16384.0, 65536.0, 262144.0, 1048576.0]
    ).unwrap();

    // ============================================================================
    // HTTP API Metrics
    // ============================================================================

    /// HTTP request counter by method and path
    pub static ref HTTP_REQUESTS_TOTAL: IntCounterVec = register_int_counter_vec!(
        format!("{}_http_requests_total", METRIC_PREFIX),
        "Total HTTP requests",
        &["method", "path", "status"]
    ).unwrap();

    /// HTTP request latency
    pub static ref HTTP_REQUEST_LATENCY: HistogramVec = register_histogram_vec!(
        format!("{}_http_request_latency_seconds", METRIC_PREFIX),
        "HTTP request latency in seconds",
        &["method", "path"],
        vec![0.001, 0.005, 0.01, 0.05, 0.1, 0.5, 1.0, 5.0, 30.0, 120.0]
    ).unwrap();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_template_counters_increment() {
        let before = TEMPLATE_CACHE_MISSES_TOTAL.get();
        TemplateMetrics::record_cache_miss();
        assert!(TEMPLATE_CACHE_MISSES_TOTAL.get() > before);
    }

    #[test]
    fn test_llm_metrics_labels() {
        LlmMetrics::record_success("analyze_category", 0.2);
        LlmMetrics::record_failure("analyze_category", "timeout", 1.0);

        let ok = LLM_REQUESTS_TOTAL
            .with_label_values(&["analyze_category", "success"])
            .get();
        let failed = LLM_ERRORS_TOTAL.with_label_values(&["timeout"]).get();
        assert!(ok >= 1);
        assert!(failed >= 1);
    }

    #[test]
    fn test_encode_metrics_contains_prefix() {
        SessionMetrics::record_created();
        let output = encode_metrics().unwrap();
        assert!(output.contains("vibe_sessions_created_total"));
    }
}
