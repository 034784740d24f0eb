use async_trait::async_trait;
use sqlx::{Postgres, QueryBuilder};
use uuid::Uuid;

use crate::application::repos::{
    AdminPostFilter, ListWindow, PostsRepo, PublishedPostFilter, RepoError,
};
use crate::domain::entities::{PostRecord, PostSummaryRecord};

use super::PostgresRepositories;
use super::types::{POST_COLUMNS, PostRow, PostSummaryRow, SUMMARY_COLUMNS};
use crate::infra::db::map_sqlx_error;

impl PostgresRepositories {
    fn published_query<'q>(
        columns: &str,
        filter: &'q PublishedPostFilter,
        window: ListWindow,
    ) -> QueryBuilder<'q, Postgres> {
        let mut qb = QueryBuilder::new("SELECT ");
        qb.push(columns);
        qb.push(" FROM posts p WHERE p.published = TRUE ");

        if filter.featured_only {
            qb.push(" AND p.featured = TRUE ");
        }
        if let Some(category) = filter.category.as_ref() {
            qb.push(" AND p.category = ");
            qb.push_bind(category);
        }

        qb.push(" ORDER BY p.pub_date DESC, p.id DESC ");
        if let Some(limit) = window.limit {
            qb.push(" LIMIT ");
            qb.push_bind(i64::from(limit));
        }
        if window.offset > 0 {
            qb.push(" OFFSET ");
            qb.push_bind(i64::from(window.offset));
        }
        qb
    }
}

#[async_trait]
impl PostsRepo for PostgresRepositories {
    async fn list_published(
        &self,
        filter: &PublishedPostFilter,
        window: ListWindow,
    ) -> Result<Vec<PostSummaryRecord>, RepoError> {
        let rows = Self::published_query(SUMMARY_COLUMNS, filter, window)
            .build_query_as::<PostSummaryRow>()
            .fetch_all(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        Ok(rows.into_iter().map(PostSummaryRecord::from).collect())
    }

    async fn list_published_with_content(
        &self,
        filter: &PublishedPostFilter,
        window: ListWindow,
    ) -> Result<Vec<PostRecord>, RepoError> {
        let rows = Self::published_query(POST_COLUMNS, filter, window)
            .build_query_as::<PostRow>()
            .fetch_all(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        Ok(rows.into_iter().map(PostRecord::from).collect())
    }

    async fn find_published_by_slug(&self, slug: &str) -> Result<Option<PostRecord>, RepoError> {
        let sql =
            format!("SELECT {POST_COLUMNS} FROM posts p WHERE p.slug = $1 AND p.published = TRUE");
        let row = sqlx::query_as::<_, PostRow>(&sql)
            .bind(slug)
            .fetch_optional(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        Ok(row.map(PostRecord::from))
    }

    async fn find_by_slug(&self, slug: &str) -> Result<Option<PostRecord>, RepoError> {
        let sql = format!("SELECT {POST_COLUMNS} FROM posts p WHERE p.slug = $1");
        let row = sqlx::query_as::<_, PostRow>(&sql)
            .bind(slug)
            .fetch_optional(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        Ok(row.map(PostRecord::from))
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<PostRecord>, RepoError> {
        let sql = format!("SELECT {POST_COLUMNS} FROM posts p WHERE p.id = $1");
        let row = sqlx::query_as::<_, PostRow>(&sql)
            .bind(id)
            .fetch_optional(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        Ok(row.map(PostRecord::from))
    }

    async fn list_for_admin(&self, filter: &AdminPostFilter) -> Result<Vec<PostRecord>, RepoError> {
        let mut qb = QueryBuilder::<Postgres>::new("SELECT ");
        qb.push(POST_COLUMNS);
        qb.push(" FROM posts p WHERE 1=1 ");

        if let Some(published) = filter.published {
            qb.push(" AND p.published = ");
            qb.push_bind(published);
        }
        if let Some(category) = filter.category.as_ref() {
            qb.push(" AND p.category = ");
            qb.push_bind(category);
        }
        if let Some(search) = filter.search.as_ref() {
            let pattern = format!("%{}%", escape_like(search));
            qb.push(" AND (p.title ILIKE ");
            qb.push_bind(pattern.clone());
            qb.push(" OR p.description ILIKE ");
            qb.push_bind(pattern);
            qb.push(")");
        }
        qb.push(" ORDER BY p.updated_at DESC, p.id DESC");

        let rows = qb
            .build_query_as::<PostRow>()
            .fetch_all(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        Ok(rows.into_iter().map(PostRecord::from).collect())
    }

    async fn ping(&self) -> Result<(), RepoError> {
        self.health_check().await.map_err(map_sqlx_error)
    }
}

/// Escape LIKE metacharacters so a search term matches literally.
fn escape_like(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len());
    for ch in term.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}
