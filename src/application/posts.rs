//! Cached read path for published posts.
//!
//! Each query derives a deterministic cache key, answers from the cache when
//! it can, and otherwise reads the store, projects the rows to [`PublicPost`]
//! and caches the result under its TTL tier. Failed reads are never cached.

use std::future::Future;
use std::sync::Arc;

use serde_json::json;
use thiserror::Error;
use tracing::error;

use crate::application::repos::{ListWindow, PostsRepo, PublishedPostFilter, RepoError};
use crate::cache::{CacheConfig, CachedPosts, PostCache, TtlTier, keys};
use crate::config::StoreFailurePolicy;
use crate::domain::posts::PublicPost;
use crate::monitor::PerformanceMonitor;

pub const DEFAULT_FEATURED_LIMIT: u32 = 5;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AllPostsOptions {
    pub include_content: bool,
    pub limit: Option<u32>,
    pub offset: u32,
}

#[derive(Debug, Error)]
pub enum PostQueryError {
    #[error("store failure while running `{query}`")]
    StoreFailure {
        query: &'static str,
        #[source]
        source: RepoError,
    },
}

#[derive(Clone)]
pub struct PostQueryService {
    repo: Arc<dyn PostsRepo>,
    cache: Arc<PostCache>,
    monitor: Arc<PerformanceMonitor>,
    ttl: CacheConfig,
    on_store_failure: StoreFailurePolicy,
}

impl PostQueryService {
    pub fn new(
        repo: Arc<dyn PostsRepo>,
        cache: Arc<PostCache>,
        monitor: Arc<PerformanceMonitor>,
        ttl: CacheConfig,
        on_store_failure: StoreFailurePolicy,
    ) -> Self {
        Self {
            repo,
            cache,
            monitor,
            ttl,
            on_store_failure,
        }
    }

    pub async fn all_posts(
        &self,
        options: AllPostsOptions,
    ) -> Result<Arc<Vec<PublicPost>>, PostQueryError> {
        let key = keys::published_posts(options.include_content, options.limit, options.offset);
        let filter = PublishedPostFilter::default();
        let window = ListWindow {
            limit: options.limit,
            offset: options.offset,
        };

        self.cached_list(key, TtlTier::List, "all_posts", || {
            self.fetch_published(filter, window, options.include_content)
        })
        .await
    }

    /// Featured posts, [`DEFAULT_FEATURED_LIMIT`] when `limit` is `None`.
    pub async fn featured_posts(
        &self,
        limit: Option<u32>,
    ) -> Result<Arc<Vec<PublicPost>>, PostQueryError> {
        let limit = limit.unwrap_or(DEFAULT_FEATURED_LIMIT);
        let filter = PublishedPostFilter {
            category: None,
            featured_only: true,
        };
        let window = ListWindow {
            limit: Some(limit),
            offset: 0,
        };

        self.cached_list(
            keys::featured_posts(limit),
            TtlTier::Featured,
            "featured_posts",
            || self.fetch_published(filter, window, false),
        )
        .await
    }

    pub async fn posts_by_category(
        &self,
        category: &str,
        limit: Option<u32>,
    ) -> Result<Arc<Vec<PublicPost>>, PostQueryError> {
        let filter = PublishedPostFilter {
            category: Some(category.to_string()),
            featured_only: false,
        };
        let window = ListWindow { limit, offset: 0 };

        self.cached_list(
            keys::category_posts(category, limit),
            TtlTier::List,
            "posts_by_category",
            || self.fetch_published(filter, window, false),
        )
        .await
    }

    /// A published post with its body. Only found posts are cached.
    pub async fn post_by_slug(
        &self,
        slug: &str,
    ) -> Result<Option<Arc<PublicPost>>, PostQueryError> {
        let key = keys::post_by_slug(slug);
        if let Some(post) = self.cache.get(&key).and_then(CachedPosts::into_single) {
            self.monitor.record_cache_hit();
            return Ok(Some(post));
        }
        self.monitor.record_cache_miss();

        let timer = self.monitor.start_query("post_by_slug");
        let result = self.repo.find_published_by_slug(slug).await;
        timer.finish(Some(json!({ "slug": slug })));

        match result {
            Ok(Some(record)) => {
                let post = Arc::new(PublicPost::from(record));
                self.cache.set(
                    key,
                    CachedPosts::Single(Arc::clone(&post)),
                    self.ttl.ttl(TtlTier::Post),
                );
                Ok(Some(post))
            }
            Ok(None) => Ok(None),
            Err(err) => self.on_failure("post_by_slug", err, None),
        }
    }

    async fn cached_list<F, Fut>(
        &self,
        key: String,
        tier: TtlTier,
        query: &'static str,
        fetch: F,
    ) -> Result<Arc<Vec<PublicPost>>, PostQueryError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Vec<PublicPost>, RepoError>>,
    {
        if let Some(posts) = self.cache.get(&key).and_then(CachedPosts::into_list) {
            self.monitor.record_cache_hit();
            return Ok(posts);
        }
        self.monitor.record_cache_miss();

        let timer = self.monitor.start_query(query);
        let result = fetch().await;

        match result {
            Ok(posts) => {
                timer.finish(Some(json!({ "key": key, "count": posts.len() })));
                let posts = Arc::new(posts);
                self.cache
                    .set(key, CachedPosts::List(Arc::clone(&posts)), self.ttl.ttl(tier));
                Ok(posts)
            }
            Err(err) => {
                timer.finish(Some(json!({ "key": key, "failed": true })));
                self.on_failure(query, err, Arc::new(Vec::new()))
            }
        }
    }

    async fn fetch_published(
        &self,
        filter: PublishedPostFilter,
        window: ListWindow,
        include_content: bool,
    ) -> Result<Vec<PublicPost>, RepoError> {
        if include_content {
            let records = self.repo.list_published_with_content(&filter, window).await?;
            Ok(records.into_iter().map(PublicPost::from).collect())
        } else {
            let records = self.repo.list_published(&filter, window).await?;
            Ok(records.into_iter().map(PublicPost::from).collect())
        }
    }

    fn on_failure<T>(
        &self,
        query: &'static str,
        err: RepoError,
        fallback: T,
    ) -> Result<T, PostQueryError> {
        match self.on_store_failure {
            StoreFailurePolicy::Degrade => {
                error!(
                    target = "gazette::application::posts",
                    query,
                    error = %err,
                    "Store query failed; serving degraded result"
                );
                self.monitor.record_error();
                Ok(fallback)
            }
            StoreFailurePolicy::Propagate => {
                Err(PostQueryError::StoreFailure { query, source: err })
            }
        }
    }
}
