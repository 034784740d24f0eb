//! Public projection of posts served by the read API.

use serde::Serialize;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::domain::entities::{PostRecord, PostSummaryRecord};
use crate::domain::types::{Difficulty, HumorLevel};

/// Post shape returned to anonymous readers. `content` is `None` for
/// metadata-only list queries.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PublicPost {
    pub id: Uuid,
    pub slug: String,
    pub title: String,
    pub description: String,
    pub content: Option<String>,
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
    #[serde(with = "time::serde::rfc3339")]
    pub pub_date: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl From<PostRecord> for PublicPost {
    fn from(record: PostRecord) -> Self {
        Self {
            id: record.id,
            slug: record.slug,
            title: record.title,
            description: record.description,
            content: Some(record.content),
            author: record.author,
            category: record.category,
            tags: record.tags,
            featured: record.featured,
            zodiac_sign: record.zodiac_sign,
            difficulty: record.difficulty,
            humor_level: record.humor_level,
            target_audience: record.target_audience,
            reading_time: record.reading_time,
            cover_image: record.cover_image,
            pub_date: record.pub_date,
            updated_at: record.updated_at,
        }
    }
}

impl From<PostSummaryRecord> for PublicPost {
    fn from(record: PostSummaryRecord) -> Self {
        Self {
            id: record.id,
            slug: record.slug,
            title: record.title,
            description: record.description,
            content: None,
            author: record.author,
            category: record.category,
            tags: record.tags,
            featured: record.featured,
            zodiac_sign: record.zodiac_sign,
            difficulty: record.difficulty,
            humor_level: record.humor_level,
            target_audience: record.target_audience,
            reading_time: record.reading_time,
            cover_image: record.cover_image,
            pub_date: record.pub_date,
            updated_at: record.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    fn record() -> PostRecord {
        PostRecord {
            id: Uuid::nil(),
            slug: "mercurio-retrogrado".into(),
            title: "Mercúrio Retrógrado".into(),
            description: "Sobreviva".into(),
            content: "Corpo".into(),
            author: "Equipe".into(),
            category: Some("astrologia".into()),
            tags: vec!["mercurio".into()],
            featured: true,
            published: true,
            zodiac_sign: None,
            difficulty: Some(Difficulty::Beginner),
            humor_level: None,
            target_audience: None,
            reading_time: Some(4),
            cover_image: None,
            pub_date: datetime!(2025-01-02 10:00 UTC),
            created_at: datetime!(2025-01-01 10:00 UTC),
            updated_at: datetime!(2025-01-03 10:00 UTC),
        }
    }

    #[test]
    fn summary_projection_drops_content() {
        let summary = PostSummaryRecord::from(&record());
        let public = PublicPost::from(summary);
        assert_eq!(public.content, None);
        assert_eq!(public.slug, "mercurio-retrogrado");
    }

    #[test]
    fn full_projection_serializes_content_and_dates() {
        let public = PublicPost::from(record());
        let value = serde_json::to_value(&public).expect("serialize");
        assert_eq!(value["content"], "Corpo");
        assert_eq!(value["pub_date"], "2025-01-02T10:00:00Z");
        assert_eq!(value["difficulty"], "beginner");
        assert!(value.get("published").is_none());
    }
}
