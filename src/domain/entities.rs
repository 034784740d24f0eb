//! Domain entities mirrored from persistent storage.

use serde::Serialize;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::domain::types::{Difficulty, HumorLevel};

/// A post row as stored, drafts included.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PostRecord {
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
    #[serde(with = "time::serde::rfc3339")]
    pub pub_date: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

/// Metadata projection used by list queries that skip the body.
#[derive(Debug, Clone, PartialEq)]
pub struct PostSummaryRecord {
    pub id: Uuid,
    pub slug: String,
    pub title: String,
    pub description: String,
    pub author: String,
    pub category: Option<String>,
    pub tags: Vec<String>,
    pub featured: bool,
    pub zodiac_sign: Option<String>,
    pub difficulty: Option<Difficulty>,
    pub humor_level: Option<HumorLevel>,
    pub target_audience: Option<String>,
    pub reading_time: Option<i32>,
    pub cover_image: Option<String>,
    pub pub_date: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

impl From<&PostRecord> for PostSummaryRecord {
    fn from(record: &PostRecord) -> Self {
        Self {
            id: record.id,
            slug: record.slug.clone(),
            title: record.title.clone(),
            description: record.description.clone(),
            author: record.author.clone(),
            category: record.category.clone(),
            tags: record.tags.clone(),
            featured: record.featured,
            zodiac_sign: record.zodiac_sign.clone(),
            difficulty: record.difficulty,
            humor_level: record.humor_level,
            target_audience: record.target_audience.clone(),
            reading_time: record.reading_time,
            cover_image: record.cover_image.clone(),
            pub_date: record.pub_date,
            updated_at: record.updated_at,
        }
    }
}
