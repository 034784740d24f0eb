//! Repository traits describing persistence adapters.

use async_trait::async_trait;
use thiserror::Error;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::domain::entities::{PostRecord, PostSummaryRecord};
use crate::domain::types::{Difficulty, HumorLevel};

#[derive(Debug, Error)]
pub enum RepoError {
    #[error("persistence error: {0}")]
    Persistence(String),
    #[error("duplicate record violates unique constraint `{constraint}`")]
    Duplicate { constraint: String },
    #[error("resource not found")]
    NotFound,
    #[error("invalid input: {message}")]
    InvalidInput { message: String },
    #[error("database timeout")]
    Timeout,
}

impl RepoError {
    pub fn from_persistence(err: impl std::fmt::Display) -> Self {
        Self::Persistence(err.to_string())
    }
}

/// Restricts a published-post listing. Filters combine with AND.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PublishedPostFilter {
    pub category: Option<String>,
    pub featured_only: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ListWindow {
    /// `None` means no limit.
    pub limit: Option<u32>,
    pub offset: u32,
}

/// Admin listing over every post, drafts included.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AdminPostFilter {
    pub published: Option<bool>,
    pub category: Option<String>,
    /// Case-insensitive substring of title or description.
    pub search: Option<String>,
}

#[derive(Debug, Clone)]
pub struct CreatePostParams {
    pub slug: String,
    pub title: String,
    pub description: String,
    pub content: String,
    pub author: String,
    pub category: Option<String>,
    pub tags: Vec<String>,
    pub featured: bool,
    pub published: bool,
    pub zodiac_sign: Option<String>,
    pub difficulty: Option<Difficulty>,
    pub humor_level: Option<HumorLevel>,
    pub target_audience: Option<String>,
    pub reading_time: Option<i32>,
    pub cover_image: Option<String>,
    pub pub_date: OffsetDateTime,
}

/// Full replacement of a post's editable fields.
#[derive(Debug, Clone)]
pub struct UpdatePostParams {
    pub id: Uuid,
    pub slug: String,
    pub title: String,
    pub description: String,
    pub content: String,
    pub author: String,
    pub category: Option<String>,
    pub tags: Vec<String>,
    pub featured: bool,
    pub published: bool,
    pub zodiac_sign: Option<String>,
    pub difficulty: Option<Difficulty>,
    pub humor_level: Option<HumorLevel>,
    pub target_audience: Option<String>,
    pub reading_time: Option<i32>,
    pub cover_image: Option<String>,
    pub pub_date: OffsetDateTime,
}

#[async_trait]
pub trait PostsRepo: Send + Sync {
    /// Published posts, metadata columns only, newest `pub_date` first.
    async fn list_published(
        &self,
        filter: &PublishedPostFilter,
        window: ListWindow,
    ) -> Result<Vec<PostSummaryRecord>, RepoError>;

    /// Published posts including the body, newest `pub_date` first.
    async fn list_published_with_content(
        &self,
        filter: &PublishedPostFilter,
        window: ListWindow,
    ) -> Result<Vec<PostRecord>, RepoError>;

    async fn find_published_by_slug(&self, slug: &str) -> Result<Option<PostRecord>, RepoError>;

    /// Any post with this slug, published or not.
    async fn find_by_slug(&self, slug: &str) -> Result<Option<PostRecord>, RepoError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<PostRecord>, RepoError>;

    /// Every post matching `filter`, most recently updated first.
    async fn list_for_admin(&self, filter: &AdminPostFilter) -> Result<Vec<PostRecord>, RepoError>;

    async fn ping(&self) -> Result<(), RepoError>;
}

#[async_trait]
pub trait PostsWriteRepo: Send + Sync {
    async fn create_post(&self, params: CreatePostParams) -> Result<PostRecord, RepoError>;

    async fn update_post(&self, params: UpdatePostParams) -> Result<PostRecord, RepoError>;

    async fn delete_post(&self, id: Uuid) -> Result<(), RepoError>;
}
