//! Metrics collection with Prometheus
//!
//! This module provides Prometheus metrics for Pinpoint:
//! - Feedback submissions by type and severity
//! - Session list requests
//! - Reports generated by format
//! - Shares created
//! - API errors and request latency by route

use prometheus::{Counter, CounterVec, HistogramOpts, HistogramVec, Opts, Registry};
use std::sync::Arc;

/// Metrics collector for Pinpoint
#[derive(Clone)]
pub struct Metrics {
    /// Prometheus registry
    registry: Arc<Registry>,

    /// Feedback records created
    pub feedback_created: CounterVec,
    /// Session list requests served
    pub feedback_listed: Counter,
    /// Reports generated
    pub reports_generated: CounterVec,
    /// Shares created
    pub shares_created: Counter,
    /// API error responses
    pub api_errors: CounterVec,
    /// API request duration
    pub request_duration_seconds: HistogramVec,
}

impl Metrics {
    /// Create a new metrics collector with its own registry
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();

        let feedback_created = CounterVec::new(
            Opts::new(
                "pinpoint_feedback_created_total",
                "Total number of feedback records created",
            ),
            &["type", "severity"],
        )?;

        let feedback_listed = Counter::with_opts(Opts::new(
            "pinpoint_feedback_listed_total",
            "Total number of session feedback list requests",
        ))?;

        let reports_generated = CounterVec::new(
            Opts::new(
                "pinpoint_reports_generated_total",
                "Total number of reports generated",
            ),
            &["format"],
        )?;

        let shares_created = Counter::with_opts(Opts::new(
            "pinpoint_shares_created_total",
            "Total number of feedback shares created",
        ))?;

        let api_errors = CounterVec::new(
            Opts::new("pinpoint_api_errors_total", "Total number of API error responses"),
            &["route", "status"],
        )?;

        let request_duration_seconds = HistogramVec::new(
            HistogramOpts::new(
                "pinpoint_request_duration_seconds",
                "API request duration in seconds",
            )
            .buckets(vec![0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0]),
            &["route"],
        )?;

        registry.register(Box::new(feedback_created.clone()))?;
        registry.register(Box::new(feedback_listed.clone()))?;
        registry.register(Box::new(reports_generated.clone()))?;
        registry.register(Box::new(shares_created.clone()))?;
        registry.register(Box::new(api_errors.clone()))?;
        registry.register(Box::new(request_duration_seconds.clone()))?;

        Ok(Self {
            registry: Arc::new(registry),
            feedback_created,
            feedback_listed,
            reports_generated,
            shares_created,
            api_errors,
            request_duration_seconds,
        })
    }

    /// Get the Prometheus registry for exporting metrics
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn record_feedback_created(&self, kind: &str, severity: &str) {
        self.feedback_created
            .with_label_values(&[kind, severity])
            .inc();
    }

    pub fn record_feedback_listed(&self) {
        self.feedback_listed.inc();
    }

    pub fn record_report_generated(&self, format: &str) {
        self.reports_generated.with_label_values(&[format]).inc();
    }

    pub fn record_share_created(&self) {
        self.shares_created.inc();
    }

    pub fn record_api_error(&self, route: &str, status: u16) {
        self.api_errors
            .with_label_values(&[route, status.to_string().as_str()])
            .inc();
    }

    pub fn observe_request(&self, route: &str, duration_secs: f64) {
        self.request_duration_seconds
            .with_label_values(&[route])
            .observe(duration_secs);
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new().expect("Failed to create metrics")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_creation() {
        let metrics = Metrics::new().unwrap();
        metrics.record_feedback_listed();
        assert!(!metrics.registry().gather().is_empty());
    }

    #[test]
    fn test_record_feedback_created() {
        let metrics = Metrics::new().unwrap();
        metrics.record_feedback_created("bug", "medium");
        metrics.record_feedback_created("bug", "medium");
        metrics.record_feedback_created("content", "low");

        assert_eq!(
            metrics
                .feedback_created
                .with_label_values(&["bug", "medium"])
                .get(),
            2.0
        );
        assert_eq!(
            metrics
                .feedback_created
                .with_label_values(&["content", "low"])
                .get(),
            1.0
        );
    }

    #[test]
    fn test_record_report_and_share() {
        let metrics = Metrics::new().unwrap();
        metrics.record_report_generated("json");
        metrics.record_share_created();

        assert_eq!(
            metrics.reports_generated.with_label_values(&["json"]).get(),
            1.0
        );
        assert_eq!(metrics.shares_created.get(), 1.0);
    }

    #[test]
    fn test_record_api_error() {
        let metrics = Metrics::new().unwrap();
        metrics.record_api_error("/api/share", 404);

        assert_eq!(
            metrics
                .api_errors
                .with_label_values(&["/api/share", "404"])
                .get(),
            1.0
        );
    }

    #[test]
    fn test_observe_request() {
        let metrics = Metrics::new().unwrap();
        metrics.observe_request("/api/feedback", 0.02);

        assert_eq!(
            metrics
                .request_duration_seconds
                .with_label_values(&["/api/feedback"])
                .get_sample_count(),
            1
        );
    }

    #[test]
    fn test_separate_registries() {
        // Each collector owns its registry, so two instances can coexist
        let a = Metrics::new().unwrap();
        let b = Metrics::new().unwrap();
        a.record_share_created();
        assert_eq!(b.shares_created.get(), 0.0);
    }
}
