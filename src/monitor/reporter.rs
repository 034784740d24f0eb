use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{self, MissedTickBehavior};
use tracing::info;

use super::recorder::PerformanceMonitor;

/// Log an aggregate summary every `every`. Quiet while no samples exist.
pub fn spawn_summary_logger(monitor: Arc<PerformanceMonitor>, every: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = time::interval(every);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        ticker.tick().await;

        loop {
            ticker.tick().await;
            let summary = monitor.summary(None);
            if summary.count == 0 {
                continue;
            }
            info!(
                target = "gazette::monitor",
                samples = summary.count,
                average_ms = format_args!("{:.2}", summary.average_ms),
                p50_ms = format_args!("{:.2}", summary.p50_ms),
                p95_ms = format_args!("{:.2}", summary.p95_ms),
                p99_ms = format_args!("{:.2}", summary.p99_ms),
                cache_hit_rate = format_args!("{:.2}", summary.cache_hit_rate),
                error_rate = format_args!("{:.2}", summary.error_rate),
                "Performance summary"
            );
        }
    })
}
