//! Public read API over published posts.

use axum::extract::rejection::QueryRejection;
use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::Response;
use serde::Deserialize;

use crate::application::posts::AllPostsOptions;

use super::HttpState;
use super::error::{ApiError, post_query_error_to_http};
use super::response::{LIST_MAX_AGE_SECS, POST_MAX_AGE_SECS, cached_json};

const SOURCE: &str = "infra::http::public";

#[derive(Debug, Default, Deserialize)]
pub struct PostListQuery {
    pub category: Option<String>,
    pub featured: Option<String>,
    pub limit: Option<u32>,
    pub offset: Option<u32>,
    pub metadata: Option<String>,
}

impl PostListQuery {
    fn flag(value: Option<&str>) -> bool {
        value == Some("true")
    }

    fn category(&self) -> Option<&str> {
        self.category
            .as_deref()
            .map(str::trim)
            .filter(|category| !category.is_empty())
    }
}

/// `GET /api/posts`: featured, then category, then everything.
pub async fn list_posts(
    State(state): State<HttpState>,
    headers: HeaderMap,
    query: Result<Query<PostListQuery>, QueryRejection>,
) -> Result<Response, ApiError> {
    let Query(query) = query.map_err(|rejection| {
        ApiError::from_error(
            SOURCE,
            StatusCode::BAD_REQUEST,
            "Invalid query parameters",
            &rejection,
        )
    })?;

    let result = if PostListQuery::flag(query.featured.as_deref()) {
        state.posts.featured_posts(query.limit).await
    } else if let Some(category) = query.category() {
        state.posts.posts_by_category(category, query.limit).await
    } else {
        state
            .posts
            .all_posts(AllPostsOptions {
                include_content: !PostListQuery::flag(query.metadata.as_deref()),
                limit: query.limit,
                offset: query.offset.unwrap_or(0),
            })
            .await
    };
    let posts = result.map_err(|err| post_query_error_to_http(SOURCE, err))?;

    cached_json(&headers, posts.as_slice(), LIST_MAX_AGE_SECS)
}

/// `GET /api/posts/{slug}`.
pub async fn get_post(
    State(state): State<HttpState>,
    headers: HeaderMap,
    Path(slug): Path<String>,
) -> Result<Response, ApiError> {
    let post = state
        .posts
        .post_by_slug(&slug)
        .await
        .map_err(|err| post_query_error_to_http(SOURCE, err))?
        .ok_or_else(|| ApiError::not_found(SOURCE, "Post not found"))?;

    cached_json(&headers, post.as_ref(), POST_MAX_AGE_SECS)
}
