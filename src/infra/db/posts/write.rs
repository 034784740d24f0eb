use async_trait::async_trait;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::application::repos::{CreatePostParams, PostsWriteRepo, RepoError, UpdatePostParams};
use crate::domain::entities::PostRecord;

use super::PostgresRepositories;
use super::types::{PostRow, RETURNING_COLUMNS};
use crate::infra::db::map_sqlx_error;

#[async_trait]
impl PostsWriteRepo for PostgresRepositories {
    async fn create_post(&self, params: CreatePostParams) -> Result<PostRecord, RepoError> {
        let CreatePostParams {
            slug,
            title,
            description,
            content,
            author,
            category,
            tags,
            featured,
            published,
            zodiac_sign,
            difficulty,
            humor_level,
            target_audience,
            reading_time,
            cover_image,
            pub_date,
        } = params;

        let id = Uuid::new_v4();
        let now = OffsetDateTime::now_utc();
        let sql = format!(
            "INSERT INTO posts (
                id, slug, title, description, content, author, category, tags,
                featured, published, zodiac_sign, difficulty, humor_level,
                target_audience, reading_time, cover_image, pub_date,
                created_at, updated_at
            )
            VALUES (
                $1, $2, $3, $4, $5, $6, $7, $8,
                $9, $10, $11, $12, $13,
                $14, $15, $16, $17,
                $18, $18
            )
            RETURNING {RETURNING_COLUMNS}"
        );

        let row = sqlx::query_as::<_, PostRow>(&sql)
            .bind(id)
            .bind(slug)
            .bind(title)
            .bind(description)
            .bind(content)
            .bind(author)
            .bind(category)
            .bind(tags)
            .bind(featured)
            .bind(published)
            .bind(zodiac_sign)
            .bind(difficulty)
            .bind(humor_level)
            .bind(target_audience)
            .bind(reading_time)
            .bind(cover_image)
            .bind(pub_date)
            .bind(now)
            .fetch_one(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        Ok(PostRecord::from(row))
    }

    async fn update_post(&self, params: UpdatePostParams) -> Result<PostRecord, RepoError> {
        let UpdatePostParams {
            id,
            slug,
            title,
            description,
            content,
            author,
            category,
            tags,
            featured,
            published,
            zodiac_sign,
            difficulty,
            humor_level,
            target_audience,
            reading_time,
            cover_image,
            pub_date,
        } = params;

        let sql = format!(
            "UPDATE posts SET
                slug = $2, title = $3, description = $4, content = $5, author = $6,
                category = $7, tags = $8, featured = $9, published = $10,
                zodiac_sign = $11, difficulty = $12, humor_level = $13,
                target_audience = $14, reading_time = $15, cover_image = $16,
                pub_date = $17, updated_at = $18
            WHERE id = $1
            RETURNING {RETURNING_COLUMNS}"
        );

        let row = sqlx::query_as::<_, PostRow>(&sql)
            .bind(id)
            .bind(slug)
            .bind(title)
            .bind(description)
            .bind(content)
            .bind(author)
            .bind(category)
            .bind(tags)
            .bind(featured)
            .bind(published)
            .bind(zodiac_sign)
            .bind(difficulty)
            .bind(humor_level)
            .bind(target_audience)
            .bind(reading_time)
            .bind(cover_image)
            .bind(pub_date)
            .bind(OffsetDateTime::now_utc())
            .fetch_one(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        Ok(PostRecord::from(row))
    }

    async fn delete_post(&self, id: Uuid) -> Result<(), RepoError> {
        let result = sqlx::query("DELETE FROM posts WHERE id = $1")
            .bind(id)
            .execute(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        if result.rows_affected() == 0 {
            return Err(RepoError::NotFound);
        }
        Ok(())
    }
}
