//! In-process key/value store with a per-entry time-to-live.

use std::collections::HashMap;
use std::sync::RwLock;
use std::time::Duration;

use tokio::time::Instant;
use tracing::{debug, warn};

use super::lock::{rw_read, rw_write};
use super::pattern::KeyPattern;

const SOURCE: &str = "cache::store";

#[derive(Debug, Clone)]
struct CacheEntry<V> {
    value: V,
    stored_at: Instant,
    ttl: Duration,
}

impl<V> CacheEntry<V> {
    fn is_expired(&self, now: Instant) -> bool {
        now.saturating_duration_since(self.stored_at) > self.ttl
    }
}

/// Size and key listing, for diagnostics only.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct CacheStats {
    pub size: usize,
    pub keys: Vec<String>,
}

/// Expiring cache shared across request handlers.
///
/// Expired entries are dropped lazily when read and in bulk by [`cleanup`].
/// There is no size bound.
///
/// [`cleanup`]: ExpiringCache::cleanup
pub struct ExpiringCache<V> {
    entries: RwLock<HashMap<String, CacheEntry<V>>>,
}

impl<V> Default for ExpiringCache<V> {
    fn default() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
        }
    }
}

impl<V: Clone> ExpiringCache<V> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, key: impl Into<String>, value: V, ttl: Duration) {
        let entry = CacheEntry {
            value,
            stored_at: Instant::now(),
            ttl,
        };
        rw_write(&self.entries, SOURCE, "set").insert(key.into(), entry);
    }

    pub fn get(&self, key: &str) -> Option<V> {
        let now = Instant::now();
        {
            let entries = rw_read(&self.entries, SOURCE, "get");
            match entries.get(key) {
                None => return None,
                Some(entry) if !entry.is_expired(now) => return Some(entry.value.clone()),
                Some(_) => {}
            }
        }

        // Re-check under the write lock; a concurrent `set` may have refreshed it.
        let mut entries = rw_write(&self.entries, SOURCE, "get.evict");
        match entries.get(key) {
            Some(entry) if entry.is_expired(now) => {
                entries.remove(key);
                None
            }
            Some(entry) => Some(entry.value.clone()),
            None => None,
        }
    }

    pub fn has(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Remove the exact key, or every key matching a `*` pattern.
    /// Returns how many entries were removed.
    pub fn invalidate(&self, pattern: &str) -> usize {
        let parsed = match KeyPattern::parse(pattern) {
            Ok(parsed) => parsed,
            Err(err) => {
                warn!(
                    target = "gazette::cache",
                    pattern,
                    error = %err,
                    "Skipping invalidation for uncompilable pattern"
                );
                return 0;
            }
        };

        let mut entries = rw_write(&self.entries, SOURCE, "invalidate");
        let removed = match &parsed {
            KeyPattern::Exact(key) => usize::from(entries.remove(key).is_some()),
            KeyPattern::Wildcard(_) => {
                let before = entries.len();
                entries.retain(|key, _| !parsed.matches(key));
                before - entries.len()
            }
        };

        debug!(target = "gazette::cache", pattern, removed, "Invalidated cache entries");
        removed
    }

    pub fn clear(&self) {
        rw_write(&self.entries, SOURCE, "clear").clear();
    }

    /// Drop every expired entry. Returns how many were removed.
    pub fn cleanup(&self) -> usize {
        let now = Instant::now();
        let mut entries = rw_write(&self.entries, SOURCE, "cleanup");
        let before = entries.len();
        entries.retain(|_, entry| !entry.is_expired(now));
        before - entries.len()
    }

    pub fn stats(&self) -> CacheStats {
        let entries = rw_read(&self.entries, SOURCE, "stats");
        let mut keys: Vec<String> = entries.keys().cloned().collect();
        keys.sort();
        CacheStats {
            size: entries.len(),
            keys,
        }
    }
}
