//! Cache key scheme.
//!
//! Every list key begins with `posts:` and every single-post key with
//! `post:slug:`, so [`ALL_LISTS`] clears lists without touching posts.

/// Pattern matching every cached post list.
pub const ALL_LISTS: &str = "posts:*";

const ALL: &str = "all";

pub fn published_posts(include_content: bool, limit: Option<u32>, offset: u32) -> String {
    format!(
        "posts:published:content={}:limit={}:offset={offset}",
        u8::from(include_content),
        limit_segment(limit)
    )
}

pub fn featured_posts(limit: u32) -> String {
    format!("posts:featured:limit={limit}")
}

pub fn category_posts(category: &str, limit: Option<u32>) -> String {
    format!("posts:category:{category}:limit={}", limit_segment(limit))
}

pub fn post_by_slug(slug: &str) -> String {
    format!("post:slug:{slug}")
}

fn limit_segment(limit: Option<u32>) -> String {
    limit.map_or_else(|| ALL.to_string(), |value| value.to_string())
}
