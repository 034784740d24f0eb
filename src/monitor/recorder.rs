//! In-process performance sample store.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use metrics::{counter, histogram};
use serde::Serialize;
use serde_json::Value;
use time::OffsetDateTime;
use tokio::time::Instant;

use crate::cache::lock::mutex_lock;

use super::summary::{CacheCounters, PerformanceSummary, summarize};
use super::timer::QueryTimer;

const SOURCE: &str = "monitor::recorder";

pub(crate) const METRIC_CACHE_HIT: &str = "gazette_cache_hit_total";
pub(crate) const METRIC_CACHE_MISS: &str = "gazette_cache_miss_total";
pub(crate) const METRIC_ERRORS: &str = "gazette_errors_total";
pub(crate) const METRIC_SAMPLE_MS: &str = "gazette_sample_ms";

const DEFAULT_MAX_SAMPLES: usize = 1000;
const DEFAULT_SLOW_QUERY: Duration = Duration::from_millis(500);

/// Default number of samples returned by [`PerformanceMonitor::recent`].
pub const DEFAULT_RECENT_LIMIT: usize = 10;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricSample {
    pub name: String,
    pub duration_ms: f64,
    #[serde(with = "time::serde::rfc3339")]
    pub recorded_at: OffsetDateTime,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Value>,
}

/// Bounded FIFO of duration samples plus global cache and error counters.
///
/// Every update is mirrored to the `metrics` facade so an exporter can be
/// attached without touching call sites.
pub struct PerformanceMonitor {
    samples: Mutex<VecDeque<MetricSample>>,
    max_samples: usize,
    slow_query: Duration,
    cache_hits: AtomicU64,
    cache_misses: AtomicU64,
    errors: AtomicU64,
    started_at: Instant,
}

impl Default for PerformanceMonitor {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_SAMPLES, DEFAULT_SLOW_QUERY)
    }
}

impl PerformanceMonitor {
    pub fn new(max_samples: usize, slow_query: Duration) -> Self {
        let max_samples = max_samples.max(1);
        Self {
            samples: Mutex::new(VecDeque::with_capacity(max_samples)),
            max_samples,
            slow_query,
            cache_hits: AtomicU64::new(0),
            cache_misses: AtomicU64::new(0),
            errors: AtomicU64::new(0),
            started_at: Instant::now(),
        }
    }

    pub fn record_metric(
        &self,
        name: impl Into<String>,
        duration_ms: f64,
        metadata: Option<Value>,
    ) {
        let name = name.into();
        histogram!(METRIC_SAMPLE_MS, "name" => name.clone()).record(duration_ms);

        let sample = MetricSample {
            name,
            duration_ms,
            recorded_at: OffsetDateTime::now_utc(),
            metadata,
        };

        let mut samples = mutex_lock(&self.samples, SOURCE, "record_metric");
        samples.push_back(sample);
        while samples.len() > self.max_samples {
            samples.pop_front();
        }
    }

    pub fn record_cache_hit(&self) {
        self.cache_hits.fetch_add(1, Ordering::Relaxed);
        counter!(METRIC_CACHE_HIT).increment(1);
    }

    pub fn record_cache_miss(&self) {
        self.cache_misses.fetch_add(1, Ordering::Relaxed);
        counter!(METRIC_CACHE_MISS).increment(1);
    }

    pub fn record_error(&self) {
        self.errors.fetch_add(1, Ordering::Relaxed);
        counter!(METRIC_ERRORS).increment(1);
    }

    /// Aggregate every sample, or only those named `name`.
    pub fn summary(&self, name: Option<&str>) -> PerformanceSummary {
        let durations: Vec<f64> = {
            let samples = mutex_lock(&self.samples, SOURCE, "summary");
            samples
                .iter()
                .filter(|sample| name.is_none_or(|wanted| sample.name == wanted))
                .map(|sample| sample.duration_ms)
                .collect()
        };

        summarize(
            durations,
            self.cache_stats(),
            self.errors.load(Ordering::Relaxed),
        )
    }

    /// The last `limit` samples, oldest first.
    pub fn recent(&self, limit: usize) -> Vec<MetricSample> {
        let samples = mutex_lock(&self.samples, SOURCE, "recent");
        let skip = samples.len().saturating_sub(limit);
        samples.iter().skip(skip).cloned().collect()
    }

    pub fn samples_named(&self, name: &str) -> Vec<MetricSample> {
        mutex_lock(&self.samples, SOURCE, "samples_named")
            .iter()
            .filter(|sample| sample.name == name)
            .cloned()
            .collect()
    }

    pub fn cache_stats(&self) -> CacheCounters {
        CacheCounters::new(
            self.cache_hits.load(Ordering::Relaxed),
            self.cache_misses.load(Ordering::Relaxed),
        )
    }

    pub fn error_count(&self) -> u64 {
        self.errors.load(Ordering::Relaxed)
    }

    pub fn reset(&self) {
        mutex_lock(&self.samples, SOURCE, "reset").clear();
        self.cache_hits.store(0, Ordering::Relaxed);
        self.cache_misses.store(0, Ordering::Relaxed);
        self.errors.store(0, Ordering::Relaxed);
    }

    pub fn uptime(&self) -> Duration {
        self.started_at.elapsed()
    }

    pub fn slow_query_threshold(&self) -> Duration {
        self.slow_query
    }

    /// Start timing a store query; the sample is recorded as `db:{query}`.
    pub fn start_query(&self, query: &'static str) -> QueryTimer<'_> {
        QueryTimer::start(self, query)
    }
}

pub(crate) fn elapsed_ms(started: Instant) -> f64 {
    started.elapsed().as_secs_f64() * 1000.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn oldest_samples_are_dropped_past_capacity() {
        let monitor = PerformanceMonitor::new(3, DEFAULT_SLOW_QUERY);
        for value in 1..=5 {
            monitor.record_metric("api", f64::from(value), None);
        }

        let durations: Vec<f64> = monitor
            .recent(10)
            .into_iter()
            .map(|sample| sample.duration_ms)
            .collect();
        assert_eq!(durations, vec![3.0, 4.0, 5.0]);
    }

    #[test]
    fn summary_over_named_bucket() {
        let monitor = PerformanceMonitor::default();
        for value in [10.0, 20.0, 30.0, 40.0, 50.0] {
            monitor.record_metric("api:posts", value, None);
        }
        monitor.record_metric("db:all_posts", 999.0, None);

        let summary = monitor.summary(Some("api:posts"));
        assert_eq!(summary.count, 5);
        assert_eq!(summary.average_ms, 30.0);
        assert_eq!(summary.min_ms, 10.0);
        assert_eq!(summary.max_ms, 50.0);
        assert_eq!(summary.p50_ms, 30.0);
        assert_eq!(summary.p95_ms, 50.0);
        assert_eq!(summary.p99_ms, 50.0);

        assert_eq!(monitor.summary(None).count, 6);
        assert_eq!(monitor.summary(Some("missing")), PerformanceSummary::default());
    }

    #[test]
    fn cache_hit_rate_and_error_rate() {
        let monitor = PerformanceMonitor::default();
        monitor.record_cache_hit();
        monitor.record_cache_hit();
        monitor.record_cache_hit();
        monitor.record_cache_miss();
        for _ in 0..4 {
            monitor.record_metric("api", 1.0, None);
        }
        monitor.record_error();

        let summary = monitor.summary(None);
        assert_eq!(summary.cache_hit_rate, 75.0);
        assert_eq!(summary.error_rate, 25.0);

        let stats = monitor.cache_stats();
        assert_eq!((stats.hits, stats.misses, stats.total), (3, 1, 4));
    }

    #[test]
    fn recent_keeps_insertion_order() {
        let monitor = PerformanceMonitor::default();
        monitor.record_metric("a", 1.0, Some(json!({ "slug": "x" })));
        monitor.record_metric("b", 2.0, None);
        monitor.record_metric("c", 3.0, None);

        let names: Vec<String> = monitor.recent(2).into_iter().map(|s| s.name).collect();
        assert_eq!(names, vec!["b", "c"]);
        assert_eq!(monitor.samples_named("a")[0].metadata, Some(json!({ "slug": "x" })));
        assert_eq!(monitor.recent(DEFAULT_RECENT_LIMIT).len(), 3);
    }

    #[test]
    fn reset_clears_samples_and_counters() {
        let monitor = PerformanceMonitor::default();
        monitor.record_metric("a", 1.0, None);
        monitor.record_cache_hit();
        monitor.record_error();
        monitor.reset();

        assert!(monitor.recent(10).is_empty());
        assert_eq!(monitor.cache_stats().total, 0);
        assert_eq!(monitor.error_count(), 0);
    }
}
