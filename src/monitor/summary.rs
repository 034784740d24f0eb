use serde::Serialize;

/// Aggregate view over a set of samples.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct PerformanceSummary {
    pub count: usize,
    pub average_ms: f64,
    pub min_ms: f64,
    pub max_ms: f64,
    pub p50_ms: f64,
    pub p95_ms: f64,
    pub p99_ms: f64,
    /// Percentage of cache lookups that hit, across every bucket.
    pub cache_hit_rate: f64,
    /// Recorded errors per sample in scope, as a percentage.
    pub error_rate: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CacheCounters {
    pub hits: u64,
    pub misses: u64,
    pub total: u64,
    pub hit_rate: f64,
}

impl CacheCounters {
    pub fn new(hits: u64, misses: u64) -> Self {
        let total = hits + misses;
        Self {
            hits,
            misses,
            total,
            hit_rate: percentage(hits, total),
        }
    }
}

/// Nearest-rank percentile over an ascending slice; 0 when empty.
pub fn percentile(sorted: &[f64], p: f64) -> f64 {
    if sorted.is_empty() {
        return 0.0;
    }
    let n = sorted.len();
    let rank = ((p / 100.0) * n as f64).ceil() as usize;
    let index = rank.saturating_sub(1).min(n - 1);
    sorted[index]
}

pub(crate) fn percentage(part: u64, whole: u64) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64 * 100.0
    }
}

pub(crate) fn summarize(
    mut durations: Vec<f64>,
    cache: CacheCounters,
    errors: u64,
) -> PerformanceSummary {
    if durations.is_empty() {
        return PerformanceSummary::default();
    }

    durations.sort_by(f64::total_cmp);
    let count = durations.len();
    let sum: f64 = durations.iter().sum();

    PerformanceSummary {
        count,
        average_ms: sum / count as f64,
        min_ms: durations[0],
        max_ms: durations[count - 1],
        p50_ms: percentile(&durations, 50.0),
        p95_ms: percentile(&durations, 95.0),
        p99_ms: percentile(&durations, 99.0),
        cache_hit_rate: cache.hit_rate,
        error_rate: percentage(errors, count as u64),
    }
}
