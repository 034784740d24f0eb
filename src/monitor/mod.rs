//! Request and query timing with on-demand aggregates.

mod recorder;
mod reporter;
mod summary;
mod timer;

pub use recorder::{DEFAULT_RECENT_LIMIT, MetricSample, PerformanceMonitor};
pub use reporter::spawn_summary_logger;
pub use summary::{CacheCounters, PerformanceSummary, percentile};
pub use timer::QueryTimer;

pub(crate) use recorder::{METRIC_CACHE_HIT, METRIC_CACHE_MISS, METRIC_ERRORS, METRIC_SAMPLE_MS};
