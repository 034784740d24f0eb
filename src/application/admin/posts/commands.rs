use time::OffsetDateTime;
use tracing::info;
use uuid::Uuid;

use crate::application::repos::{CreatePostParams, UpdatePostParams};
use crate::domain::entities::PostRecord;

use super::service::AdminPostService;
use super::types::{
    AdminPostError, CreatePostCommand, DEFAULT_AUTHOR, UpdatePostCommand, ensure_non_empty,
    ensure_reading_time, normalize_slug, normalize_tags, trim_optional,
};

impl AdminPostService {
    pub async fn create_post(
        &self,
        command: CreatePostCommand,
    ) -> Result<PostRecord, AdminPostError> {
        let slug = normalize_slug(&command.slug)?;
        ensure_non_empty(&command.title, "title")?;
        ensure_non_empty(&command.description, "description")?;
        ensure_non_empty(&command.content, "content")?;
        let reading_time = ensure_reading_time(command.reading_time)?;

        if self.reader.find_by_slug(&slug).await?.is_some() {
            return Err(AdminPostError::Conflict { slug });
        }

        let params = CreatePostParams {
            slug: slug.clone(),
            title: command.title.trim().to_string(),
            description: command.description.trim().to_string(),
            content: command.content,
            author: trim_optional(command.author).unwrap_or_else(|| DEFAULT_AUTHOR.to_string()),
            category: trim_optional(command.category),
            tags: normalize_tags(command.tags),
            featured: command.featured,
            published: command.published,
            zodiac_sign: trim_optional(command.zodiac_sign),
            difficulty: command.difficulty,
            humor_level: command.humor_level,
            target_audience: trim_optional(command.target_audience),
            reading_time,
            cover_image: trim_optional(command.cover_image),
            pub_date: command.pub_date.unwrap_or_else(OffsetDateTime::now_utc),
        };

        let post = self
            .writer
            .create_post(params)
            .await
            .map_err(|err| AdminPostError::from_write(err, &slug))?;

        self.invalidate(&[post.slug.as_str()]);
        info!(
            target = "gazette::application::admin::posts",
            post_id = %post.id,
            slug = %post.slug,
            published = post.published,
            "Post created"
        );

        Ok(post)
    }

    pub async fn update_post(
        &self,
        command: UpdatePostCommand,
    ) -> Result<PostRecord, AdminPostError> {
        let existing = self
            .reader
            .find_by_id(command.id)
            .await?
            .ok_or(AdminPostError::NotFound)?;

        let slug = match command.slug.as_deref() {
            Some(value) => normalize_slug(value)?,
            None => existing.slug.clone(),
        };
        for (value, field) in [
            (command.title.as_deref(), "title"),
            (command.description.as_deref(), "description"),
            (command.content.as_deref(), "content"),
        ] {
            if let Some(value) = value {
                ensure_non_empty(value, field)?;
            }
        }
        let reading_time = ensure_reading_time(command.reading_time)?;

        if slug != existing.slug && self.reader.find_by_slug(&slug).await?.is_some() {
            return Err(AdminPostError::Conflict { slug });
        }

        let params = merge(existing.clone(), command, slug.clone(), reading_time);
        let post = self
            .writer
            .update_post(params)
            .await
            .map_err(|err| AdminPostError::from_write(err, &slug))?;

        self.invalidate(&[existing.slug.as_str(), post.slug.as_str()]);
        info!(
            target = "gazette::application::admin::posts",
            post_id = %post.id,
            slug = %post.slug,
            previous_slug = %existing.slug,
            "Post updated"
        );

        Ok(post)
    }

    pub async fn delete_post(&self, id: Uuid) -> Result<(), AdminPostError> {
        let existing = self
            .reader
            .find_by_id(id)
            .await?
            .ok_or(AdminPostError::NotFound)?;

        self.writer
            .delete_post(id)
            .await
            .map_err(|err| AdminPostError::from_write(err, &existing.slug))?;

        self.invalidate(&[existing.slug.as_str()]);
        info!(
            target = "gazette::application::admin::posts",
            post_id = %id,
            slug = %existing.slug,
            "Post deleted"
        );

        Ok(())
    }
}

fn merge(
    existing: PostRecord,
    command: UpdatePostCommand,
    slug: String,
    reading_time: Option<i32>,
) -> UpdatePostParams {
    fn replace_optional(current: Option<String>, supplied: Option<String>) -> Option<String> {
        match supplied {
            Some(value) => trim_optional(Some(value)),
            None => current,
        }
    }

    UpdatePostParams {
        id: existing.id,
        slug,
        title: command
            .title
            .map(|value| value.trim().to_string())
            .unwrap_or(existing.title),
        description: command
            .description
            .map(|value| value.trim().to_string())
            .unwrap_or(existing.description),
        content: command.content.unwrap_or(existing.content),
        author: trim_optional(command.author).unwrap_or(existing.author),
        category: replace_optional(existing.category, command.category),
        tags: command.tags.map(normalize_tags).unwrap_or(existing.tags),
        featured: command.featured.unwrap_or(existing.featured),
        published: command.published.unwrap_or(existing.published),
        zodiac_sign: replace_optional(existing.zodiac_sign, command.zodiac_sign),
        difficulty: command.difficulty.or(existing.difficulty),
        humor_level: command.humor_level.or(existing.humor_level),
        target_audience: replace_optional(existing.target_audience, command.target_audience),
        reading_time: reading_time.or(existing.reading_time),
        cover_image: replace_optional(existing.cover_image, command.cover_image),
        pub_date: command.pub_date.unwrap_or(existing.pub_date),
    }
}
