//! Metrics and observability utilities
//!
//! Provides Prometheus metrics with SLO-aligned histograms
//! and standardized naming conventions.

use metrics::{
    counter, describe_counter, describe_gauge, describe_histogram, gauge, histogram, Unit,
};
use std::time::Instant;

/// Metrics prefix for all Foncier metrics
pub const METRICS_PREFIX: &str = "foncier";

/// SLO-aligned histogram buckets for request latency (in seconds)
/// Targets: P50 < 50ms, P99 < 250ms
pub const LATENCY_BUCKETS: &[f64] = &[
    0.001,  // 1ms
    0.005,  // 5ms
    0.010,  // 10ms
    0.025,  // 25ms
    0.050,  // 50ms - P50 target
    0.100,  // 100ms
    0.250,  // 250ms - P99 target
    0.500,  // 500ms
    1.000,  // 1s
    2.500,  // 2.5s
    5.000,  // 5s
];

/// Register all metric descriptions
pub fn register_metrics() {
    // Request metrics
    describe_counter!(
        format!("{}_requests_total", METRICS_PREFIX),
        Unit::Count,
        "Total number of HTTP requests"
    );

    describe_histogram!(
        format!("{}_request_duration_seconds", METRICS_PREFIX),
        Unit::Seconds,
        "HTTP request latency in seconds"
    );

    // Listing metrics
    describe_counter!(
        format!("{}_terrain_listings_total", METRICS_PREFIX),
        Unit::Count,
        "Total terrain listing queries"
    );

    describe_histogram!(
        format!("{}_terrain_listing_duration_seconds", METRICS_PREFIX),
        Unit::Seconds,
        "Terrain listing latency in seconds"
    );

    describe_gauge!(
        format!("{}_terrain_listing_matches", METRICS_PREFIX),
        Unit::Count,
        "Total rows matched by the last listing query"
    );

    // Mutation metrics
    describe_counter!(
        format!("{}_terrain_writes_total", METRICS_PREFIX),
        Unit::Count,
        "Terrain create/update/delete operations"
    );

    describe_counter!(
        format!("{}_validation_failures_total", METRICS_PREFIX),
        Unit::Count,
        "Payloads rejected by the validation gate"
    );

    // Analytics metrics
    describe_counter!(
        format!("{}_analytics_reports_total", METRICS_PREFIX),
        Unit::Count,
        "Analytics reports computed"
    );

    describe_histogram!(
        format!("{}_analytics_duration_seconds", METRICS_PREFIX),
        Unit::Seconds,
        "Analytics computation latency in seconds"
    );

    // Database metrics
    describe_histogram!(
        format!("{}_db_query_duration_seconds", METRICS_PREFIX),
        Unit::Seconds,
        "Database query latency in seconds"
    );

    tracing::info!("Metrics registered");
}

/// Helper to record request metrics
pub struct RequestMetrics {
    start: Instant,
    endpoint: String,
    method: String,
}

impl RequestMetrics {
    /// Start tracking a request
    pub fn start(method: &str, endpoint: &str) -> Self {
        Self {
            start: Instant::now(),
            endpoint: endpoint.to_string(),
            method: method.to_string(),
        }
    }

    /// Record request completion
    pub fn finish(self, status: u16) {
        let duration = self.start.elapsed().as_secs_f64();

        counter!(
            format!("{}_requests_total", METRICS_PREFIX),
            "method" => self.method.clone(),
            "endpoint" => self.endpoint.clone(),
            "status" => status.to_string()
        )
        .increment(1);

        histogram!(
            format!("{}_request_duration_seconds", METRICS_PREFIX),
            "method" => self.method,
            "endpoint" => self.endpoint
        )
        .record(duration);
    }
}

/// Helper to record listing metrics
pub fn record_listing(duration_secs: f64, total_matches: u64) {
    counter!(format!("{}_terrain_listings_total", METRICS_PREFIX)).increment(1);

    histogram!(format!("{}_terrain_listing_duration_seconds", METRICS_PREFIX))
        .record(duration_secs);

    gauge!(format!("{}_terrain_listing_matches", METRICS_PREFIX)).set(total_matches as f64);
}

/// Helper to record terrain mutations
pub fn record_terrain_write(operation: &str) {
    counter!(
        format!("{}_terrain_writes_total", METRICS_PREFIX),
        "operation" => operation.to_string()
    )
    .increment(1);
}

/// Helper to record validation gate rejections
pub fn record_validation_failure(operation: &str, error_count: usize) {
    counter!(
        format!("{}_validation_failures_total", METRICS_PREFIX),
        "operation" => operation.to_string()
    )
    .increment(error_count as u64);
}

/// Helper to record analytics metrics
pub fn record_analytics(duration_secs: f64) {
    counter!(format!("{}_analytics_reports_total", METRICS_PREFIX)).increment(1);

    histogram!(format!("{}_analytics_duration_seconds", METRICS_PREFIX)).record(duration_secs);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_latency_buckets() {
        // Verify buckets are sorted and contain SLO targets
        let mut prev = 0.0;
        for &bucket in LATENCY_BUCKETS {
            assert!(bucket > prev);
            prev = bucket;
        }

        // P50 target (50ms) should be in buckets
        assert!(LATENCY_BUCKETS.contains(&0.050));
        // P99 target (250ms) should be in buckets
        assert!(LATENCY_BUCKETS.contains(&0.250));
    }

    #[test]
    fn test_request_metrics() {
        let metrics = RequestMetrics::start("GET", "/v1/terrains");
        std::thread::sleep(std::time::Duration::from_millis(5));
        metrics.finish(200);
        // Just verify it runs without panic
    }
}
