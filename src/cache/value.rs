use std::sync::Arc;

use crate::domain::posts::PublicPost;

/// Shapes stored in the post cache. Both hold `Arc`s so a hit is a pointer copy.
#[derive(Debug, Clone)]
pub enum CachedPosts {
    List(Arc<Vec<PublicPost>>),
    Single(Arc<PublicPost>),
}

impl CachedPosts {
    pub fn into_list(self) -> Option<Arc<Vec<PublicPost>>> {
        match self {
            Self::List(posts) => Some(posts),
            Self::Single(_) => None,
        }
    }

    pub fn into_single(self) -> Option<Arc<PublicPost>> {
        match self {
            Self::Single(post) => Some(post),
            Self::List(_) => None,
        }
    }
}
