use time::OffsetDateTime;
use uuid::Uuid;

use crate::domain::entities::{PostRecord, PostSummaryRecord};
use crate::domain::types::{Difficulty, HumorLevel};

pub(crate) const POST_COLUMNS: &str = "p.id, p.slug, p.title, p.description, p.content, \
     p.author, p.category, p.tags, p.featured, p.published, p.zodiac_sign, p.difficulty, \
     p.humor_level, p.target_audience, p.reading_time, p.cover_image, p.pub_date, \
     p.created_at, p.updated_at";

pub(crate) const SUMMARY_COLUMNS: &str = "p.id, p.slug, p.title, p.description, \
     p.author, p.category, p.tags, p.featured, p.zodiac_sign, p.difficulty, \
     p.humor_level, p.target_audience, p.reading_time, p.cover_image, p.pub_date, \
     p.updated_at";

pub(crate) const RETURNING_COLUMNS: &str = "id, slug, title, description, content, \
     author, category, tags, featured, published, zodiac_sign, difficulty, \
     humor_level, target_audience, reading_time, cover_image, pub_date, \
     created_at, updated_at";

#[derive(sqlx::FromRow)]
pub(crate) struct PostRow {
    pub(crate) id: Uuid,
    pub(crate) slug: String,
    pub(crate) title: String,
    pub(crate) description: String,
    pub(crate) content: String,
    pub(crate) author: String,
    pub(crate) category: Option<String>,
    pub(crate) tags: Vec<String>,
    pub(crate) featured: bool,
    pub(crate) published: bool,
    pub(crate) zodiac_sign: Option<String>,
    pub(crate) difficulty: Option<Difficulty>,
    pub(crate) humor_level: Option<HumorLevel>,
    pub(crate) target_audience: Option<String>,
    pub(crate) reading_time: Option<i32>,
    pub(crate) cover_image: Option<String>,
    pub(crate) pub_date: OffsetDateTime,
    pub(crate) created_at: OffsetDateTime,
    pub(crate) updated_at: OffsetDateTime,
}

impl From<PostRow> for PostRecord {
    fn from(row: PostRow) -> Self {
        Self {
            id: row.id,
            slug: row.slug,
            title: row.title,
            description: row.description,
            content: row.content,
            author: row.author,
            category: row.category,
            tags: row.tags,
            featured: row.featured,
            published: row.published,
            zodiac_sign: row.zodiac_sign,
            difficulty: row.difficulty,
            humor_level: row.humor_level,
            target_audience: row.target_audience,
            reading_time: row.reading_time,
            cover_image: row.cover_image,
            pub_date: row.pub_date,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(sqlx::FromRow)]
pub(crate) struct PostSummaryRow {
    pub(crate) id: Uuid,
    pub(crate) slug: String,
    pub(crate) title: String,
    pub(crate) description: String,
    pub(crate) author: String,
    pub(crate) category: Option<String>,
    pub(crate) tags: Vec<String>,
    pub(crate) featured: bool,
    pub(crate) zodiac_sign: Option<String>,
    pub(crate) difficulty: Option<Difficulty>,
    pub(crate) humor_level: Option<HumorLevel>,
    pub(crate) target_audience: Option<String>,
    pub(crate) reading_time: Option<i32>,
    pub(crate) cover_image: Option<String>,
    pub(crate) pub_date: OffsetDateTime,
    pub(crate) updated_at: OffsetDateTime,
}

impl From<PostSummaryRow> for PostSummaryRecord {
    fn from(row: PostSummaryRow) -> Self {
        Self {
            id: row.id,
            slug: row.slug,
            title: row.title,
            description: row.description,
            author: row.author,
            category: row.category,
            tags: row.tags,
            featured: row.featured,
            zodiac_sign: row.zodiac_sign,
            difficulty: row.difficulty,
            humor_level: row.humor_level,
            target_audience: row.target_audience,
            reading_time: row.reading_time,
            cover_image: row.cover_image,
            pub_date: row.pub_date,
            updated_at: row.updated_at,
        }
    }
}
