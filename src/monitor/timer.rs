use serde_json::Value;
use tokio::time::Instant;
use tracing::warn;

use super::recorder::{PerformanceMonitor, elapsed_ms};

/// Times one store query. Dropping without [`finish`](QueryTimer::finish) records nothing.
#[must_use = "call `finish` to record the query duration"]
pub struct QueryTimer<'a> {
    monitor: &'a PerformanceMonitor,
    query: &'static str,
    started: Instant,
}

impl<'a> QueryTimer<'a> {
    pub(crate) fn start(monitor: &'a PerformanceMonitor, query: &'static str) -> Self {
        Self {
            monitor,
            query,
            started: Instant::now(),
        }
    }

    /// Record the elapsed time as `db:{query}` and return it in milliseconds.
    pub fn finish(self, metadata: Option<Value>) -> f64 {
        let duration_ms = elapsed_ms(self.started);
        let threshold_ms = self.monitor.slow_query_threshold().as_secs_f64() * 1000.0;
        if duration_ms > threshold_ms {
            warn!(
                target = "gazette::monitor::slow_query",
                query = self.query,
                duration_ms,
                threshold_ms,
                metadata = ?metadata,
                "Slow store query"
            );
        }

        self.monitor
            .record_metric(format!("db:{}", self.query), duration_ms, metadata);
        duration_ms
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use serde_json::json;
    use tokio::time::advance;

    use super::*;

    #[tokio::test(start_paused = true)]
    async fn finish_records_prefixed_sample() {
        let monitor = PerformanceMonitor::new(10, Duration::from_millis(500));
        let timer = monitor.start_query("post_by_slug");
        advance(Duration::from_millis(600)).await;
        let elapsed = timer.finish(Some(json!({ "slug": "a" })));

        assert!(elapsed >= 600.0);
        let samples = monitor.samples_named("db:post_by_slug");
        assert_eq!(samples.len(), 1);
        assert_eq!(samples[0].metadata, Some(json!({ "slug": "a" })));
    }
}
