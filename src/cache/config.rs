//! TTL tiers and sweep cadence for the post cache.

use std::time::Duration;

use crate::config::CacheSettings;

const DEFAULT_SWEEP_INTERVAL: Duration = Duration::from_secs(10 * 60);
const DEFAULT_LIST_TTL: Duration = Duration::from_secs(5 * 60);
const DEFAULT_FEATURED_TTL: Duration = Duration::from_secs(10 * 60);
const DEFAULT_POST_TTL: Duration = Duration::from_secs(15 * 60);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TtlTier {
    /// Published, category and other list queries.
    List,
    Featured,
    /// A single post looked up by slug.
    Post,
}

#[derive(Debug, Clone)]
pub struct CacheConfig {
    pub sweep_interval: Duration,
    pub list_ttl: Duration,
    pub featured_ttl: Duration,
    pub post_ttl: Duration,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            sweep_interval: DEFAULT_SWEEP_INTERVAL,
            list_ttl: DEFAULT_LIST_TTL,
            featured_ttl: DEFAULT_FEATURED_TTL,
            post_ttl: DEFAULT_POST_TTL,
        }
    }
}

impl From<&CacheSettings> for CacheConfig {
    fn from(settings: &CacheSettings) -> Self {
        Self {
            sweep_interval: settings.sweep_interval,
            list_ttl: settings.list_ttl,
            featured_ttl: settings.featured_ttl,
            post_ttl: settings.post_ttl,
        }
    }
}

impl CacheConfig {
    pub fn ttl(&self, tier: TtlTier) -> Duration {
        match tier {
            TtlTier::List => self.list_ttl,
            TtlTier::Featured => self.featured_ttl,
            TtlTier::Post => self.post_ttl,
        }
    }
}
