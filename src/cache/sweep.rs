use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{self, MissedTickBehavior};
use tracing::debug;

use super::store::ExpiringCache;

/// Spawn the periodic expiry sweep. The caller owns the handle and aborts it on shutdown.
pub fn spawn_sweeper<V>(cache: Arc<ExpiringCache<V>>, every: Duration) -> JoinHandle<()>
where
    V: Clone + Send + Sync + 'static,
{
    tokio::spawn(async move {
        let mut ticker = time::interval(every);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // The first tick completes immediately.
        ticker.tick().await;

        loop {
            ticker.tick().await;
            let removed = cache.cleanup();
            if removed > 0 {
                debug!(
                    target = "gazette::cache::sweep",
                    removed,
                    "Swept expired cache entries"
                );
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn sweeper_drops_expired_entries_without_reads() {
        let cache = Arc::new(ExpiringCache::new());
        cache.set("posts:featured:limit=5", 1_u8, Duration::from_secs(30));
        cache.set("post:slug:a", 2_u8, Duration::from_secs(3600));

        let handle = spawn_sweeper(Arc::clone(&cache), Duration::from_secs(60));
        time::sleep(Duration::from_secs(61)).await;

        assert_eq!(cache.stats().keys, vec!["post:slug:a".to_string()]);
        handle.abort();
    }
}
