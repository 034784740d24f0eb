use thiserror::Error;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::application::repos::RepoError;
use crate::domain::slug::{SlugError, validate_slug};
use crate::domain::types::{Difficulty, HumorLevel};

/// Author recorded when a create command leaves it blank.
pub const DEFAULT_AUTHOR: &str = "Gazette Editorial";

#[derive(Debug, Error)]
pub enum AdminPostError {
    #[error("{message}")]
    Validation {
        field: &'static str,
        message: String,
    },
    #[error("slug `{slug}` already exists")]
    Conflict { slug: String },
    #[error("post not found")]
    NotFound,
    #[error(transparent)]
    Repo(#[from] RepoError),
}

impl AdminPostError {
    pub fn validation(field: &'static str, message: impl Into<String>) -> Self {
        Self::Validation {
            field,
            message: message.into(),
        }
    }

    /// Map a write failure, turning a unique-slug race into `Conflict`.
    pub(crate) fn from_write(err: RepoError, slug: &str) -> Self {
        match err {
            RepoError::Duplicate { .. } => Self::Conflict {
                slug: slug.to_string(),
            },
            RepoError::NotFound => Self::NotFound,
            other => Self::Repo(other),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct CreatePostCommand {
    pub slug: String,
    pub title: String,
    pub description: String,
    pub content: String,
    pub author: Option<String>,
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
    pub pub_date: Option<OffsetDateTime>,
}

/// Partial update; `None` leaves a field untouched. For optional text fields
/// a blank value clears the stored one.
#[derive(Debug, Clone, Default)]
pub struct UpdatePostCommand {
    pub id: Uuid,
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
    pub pub_date: Option<OffsetDateTime>,
}

pub fn ensure_non_empty(value: &str, field: &'static str) -> Result<(), AdminPostError> {
    if value.trim().is_empty() {
        return Err(AdminPostError::validation(field, format!("{field} is required")));
    }
    Ok(())
}

/// Trimmed, canonical slug or a validation error naming the fix.
pub fn normalize_slug(value: &str) -> Result<String, AdminPostError> {
    ensure_non_empty(value, "slug")?;
    let slug = value.trim();
    match validate_slug(slug) {
        Ok(()) => Ok(slug.to_string()),
        Err(SlugError::NotCanonical { suggestion, .. }) => Err(AdminPostError::validation(
            "slug",
            format!(
                "slug must use lowercase letters, digits and single hyphens (try `{suggestion}`)"
            ),
        )),
        Err(err) => Err(AdminPostError::validation("slug", err.to_string())),
    }
}

pub fn ensure_reading_time(value: Option<i32>) -> Result<Option<i32>, AdminPostError> {
    match value {
        Some(minutes) if minutes <= 0 => Err(AdminPostError::validation(
            "reading_time",
            "reading_time must be a positive number of minutes",
        )),
        other => Ok(other),
    }
}

/// Trim an optional text field, treating blank as absent.
pub fn trim_optional(value: Option<String>) -> Option<String> {
    value.and_then(|raw| {
        let trimmed = raw.trim();
        (!trimmed.is_empty()).then(|| trimmed.to_string())
    })
}

/// Trim tags, drop blanks and repeated entries, keep first-seen order.
pub fn normalize_tags(tags: Vec<String>) -> Vec<String> {
    let mut seen = Vec::with_capacity(tags.len());
    for tag in tags {
        let trimmed = tag.trim();
        if !trimmed.is_empty() && !seen.iter().any(|existing: &String| existing == trimmed) {
            seen.push(trimmed.to_string());
        }
    }
    seen
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_required_field_names_the_field() {
        let err = ensure_non_empty("   ", "title").expect_err("blank");
        match err {
            AdminPostError::Validation { field, message } => {
                assert_eq!(field, "title");
                assert_eq!(message, "title is required");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn slug_is_trimmed_and_checked() {
        assert_eq!(
            normalize_slug("  lua-cheia ").expect("canonical"),
            "lua-cheia"
        );

        let err = normalize_slug("Lua Cheia").expect_err("not canonical");
        assert!(err.to_string().contains("try `lua-cheia`"));
    }

    #[test]
    fn reading_time_must_be_positive() {
        assert!(ensure_reading_time(Some(0)).is_err());
        assert!(ensure_reading_time(Some(-3)).is_err());
        assert_eq!(ensure_reading_time(Some(7)).expect("valid"), Some(7));
        assert_eq!(ensure_reading_time(None).expect("valid"), None);
    }

    #[test]
    fn tags_are_cleaned() {
        let tags = normalize_tags(vec![
            " humor ".into(),
            "".into(),
            "signos".into(),
            "humor".into(),
        ]);
        assert_eq!(tags, vec!["humor".to_string(), "signos".to_string()]);
    }

    #[test]
    fn duplicate_write_maps_to_conflict() {
        let err = AdminPostError::from_write(
            RepoError::Duplicate {
                constraint: "posts_slug_key".into(),
            },
            "a",
        );
        assert!(matches!(err, AdminPostError::Conflict { slug } if slug == "a"));
    }
}
