use axum::Json;
use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde::Deserialize;
use serde_json::json;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::application::admin::posts::{CreatePostCommand, UpdatePostCommand};
use crate::application::repos::AdminPostFilter;
use crate::domain::types::{Difficulty, HumorLevel};

use super::super::HttpState;
use super::super::error::{ApiError, admin_post_error_to_http};

const SOURCE: &str = "infra::http::admin::posts";

#[derive(Debug, Default, Deserialize)]
pub struct AdminPostListQuery {
    pub published: Option<bool>,
    pub category: Option<String>,
    pub search: Option<String>,
}

impl From<AdminPostListQuery> for AdminPostFilter {
    fn from(query: AdminPostListQuery) -> Self {
        let non_blank = |value: Option<String>| value.filter(|v| !v.trim().is_empty());
        Self {
            published: query.published,
            category: non_blank(query.category),
            search: non_blank(query.search),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct PostCreateRequest {
    #[serde(default)]
    pub slug: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub content: String,
    pub author: Option<String>,
    pub category: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub featured: bool,
    #[serde(default)]
    pub published: bool,
    pub zodiac_sign: Option<String>,
    pub difficulty: Option<Difficulty>,
    pub humor_level: Option<HumorLevel>,
    pub target_audience: Option<String>,
    pub reading_time: Option<i32>,
    pub cover_image: Option<String>,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub pub_date: Option<OffsetDateTime>,
}

impl From<PostCreateRequest> for CreatePostCommand {
    fn from(request: PostCreateRequest) -> Self {
        Self {
            slug: request.slug,
            title: request.title,
            description: request.description,
            content: request.content,
            author: request.author,
            category: request.category,
            tags: request.tags,
            featured: request.featured,
            published: request.published,
            zodiac_sign: request.zodiac_sign,
            difficulty: request.difficulty,
            humor_level: request.humor_level,
            target_audience: request.target_audience,
            reading_time: request.reading_time,
            cover_image: request.cover_image,
            pub_date: request.pub_date,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct PostUpdateRequest {
    pub slug: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub content: Option<String>,
    pub author: Option<String>,
    pub category: Option<String>,
    pub tags: Option<Vec<String>>,
    pub featured: Option<bool>,
    pub published: Option<bool>,
    pub zodiac_sign: Option<String>,
    pub difficulty: Option<Difficulty>,
    pub humor_level: Option<HumorLevel>,
    pub target_audience: Option<String>,
    pub reading_time: Option<i32>,
    pub cover_image: Option<String>,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub pub_date: Option<OffsetDateTime>,
}

impl PostUpdateRequest {
    fn into_command(self, id: Uuid) -> UpdatePostCommand {
        UpdatePostCommand {
            id,
            slug: self.slug,
            title: self.title,
            description: self.description,
            content: self.content,
            author: self.author,
            category: self.category,
            tags: self.tags,
            featured: self.featured,
            published: self.published,
            zodiac_sign: self.zodiac_sign,
            difficulty: self.difficulty,
            humor_level: self.humor_level,
            target_audience: self.target_audience,
            reading_time: self.reading_time,
            cover_image: self.cover_image,
            pub_date: self.pub_date,
        }
    }
}

fn bad_body(rejection: JsonRejection) -> ApiError {
    ApiError::from_error(
        SOURCE,
        StatusCode::BAD_REQUEST,
        "Invalid request body",
        &rejection,
    )
}

fn bad_id(rejection: PathRejection) -> ApiError {
    ApiError::from_error(SOURCE, StatusCode::BAD_REQUEST, "Invalid post id", &rejection)
}

pub(super) async fn list_posts(
    State(state): State<HttpState>,
    query: Result<Query<AdminPostListQuery>, QueryRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Query(query) = query.map_err(|rejection| {
        ApiError::from_error(
            SOURCE,
            StatusCode::BAD_REQUEST,
            "Invalid query parameters",
            &rejection,
        )
    })?;

    let posts = state
        .admin_posts
        .list(&AdminPostFilter::from(query))
        .await
        .map_err(|err| admin_post_error_to_http(SOURCE, err))?;

    Ok(Json(posts))
}

pub(super) async fn create_post(
    State(state): State<HttpState>,
    payload: Result<Json<PostCreateRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(payload) = payload.map_err(bad_body)?;

    let post = state
        .admin_posts
        .create_post(CreatePostCommand::from(payload))
        .await
        .map_err(|err| admin_post_error_to_http(SOURCE, err))?;

    Ok((StatusCode::CREATED, Json(post)))
}

pub(super) async fn get_post(
    State(state): State<HttpState>,
    id: Result<Path<Uuid>, PathRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Path(id) = id.map_err(bad_id)?;

    let post = state
        .admin_posts
        .load_post(id)
        .await
        .map_err(|err| admin_post_error_to_http(SOURCE, err))?;

    Ok(Json(post))
}

pub(super) async fn update_post(
    State(state): State<HttpState>,
    id: Result<Path<Uuid>, PathRejection>,
    payload: Result<Json<PostUpdateRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Path(id) = id.map_err(bad_id)?;
    let Json(payload) = payload.map_err(bad_body)?;

    let post = state
        .admin_posts
        .update_post(payload.into_command(id))
        .await
        .map_err(|err| admin_post_error_to_http(SOURCE, err))?;

    Ok(Json(post))
}

pub(super) async fn delete_post(
    State(state): State<HttpState>,
    id: Result<Path<Uuid>, PathRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Path(id) = id.map_err(bad_id)?;

    state
        .admin_posts
        .delete_post(id)
        .await
        .map_err(|err| admin_post_error_to_http(SOURCE, err))?;

    Ok(Json(json!({ "success": true })))
}
