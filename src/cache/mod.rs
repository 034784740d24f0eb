//! Expiring key/value cache for the public read path.
//!
//! Entries carry their own TTL and are invalidated by exact key or by a `*`
//! pattern. Writers invalidate synchronously; a background sweep removes
//! entries nobody reads again.

mod config;
pub mod keys;
pub(crate) mod lock;
mod pattern;
mod store;
mod sweep;
mod value;

pub use config::{CacheConfig, TtlTier};
pub use pattern::KeyPattern;
pub use store::{CacheStats, ExpiringCache};
pub use sweep::spawn_sweeper;
pub use value::CachedPosts;

/// The cache instance shared by post queries and mutations.
pub type PostCache = ExpiringCache<CachedPosts>;
