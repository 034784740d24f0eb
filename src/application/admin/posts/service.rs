use std::sync::Arc;

use tracing::debug;

use crate::application::repos::{PostsRepo, PostsWriteRepo};
use crate::cache::{PostCache, keys};

#[derive(Clone)]
pub struct AdminPostService {
    pub(crate) reader: Arc<dyn PostsRepo>,
    pub(crate) writer: Arc<dyn PostsWriteRepo>,
    pub(crate) cache: Arc<PostCache>,
}

impl AdminPostService {
    pub fn new(
        reader: Arc<dyn PostsRepo>,
        writer: Arc<dyn PostsWriteRepo>,
        cache: Arc<PostCache>,
    ) -> Self {
        Self {
            reader,
            writer,
            cache,
        }
    }

    /// Drop the single-post entries for `slugs` and every cached list.
    pub(crate) fn invalidate(&self, slugs: &[&str]) {
        let mut removed = 0;
        for slug in slugs {
            removed += self.cache.invalidate(&keys::post_by_slug(slug));
        }
        removed += self.cache.invalidate(keys::ALL_LISTS);

        debug!(
            target = "gazette::application::admin::posts",
            slugs = ?slugs,
            removed,
            "Invalidated post cache entries"
        );
    }
}
