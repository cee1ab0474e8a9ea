use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::error::ApiError;

/// Bookmark record in the database. Bookmarks are the targets ratings point
/// at; they carry no owner.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Bookmark {
    pub id: Uuid,
    pub title: String,
    pub url: String,
    pub created_at: OffsetDateTime,
}

impl Bookmark {
    pub async fn list(db: &PgPool, limit: i64, offset: i64) -> Result<Vec<Bookmark>, ApiError> {
        let rows = sqlx::query_as::<_, Bookmark>(
            r#"
            SELECT id, title, url, created_at
            FROM bookmarks
            ORDER BY created_at DESC
            LIMIT $1 OFFSET $2
            "#,
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(db)
        .await?;
        Ok(rows)
    }

    pub async fn find_by_id(db: &PgPool, id: Uuid) -> Result<Option<Bookmark>, ApiError> {
        let bookmark = sqlx::query_as::<_, Bookmark>(
            r#"
            SELECT id, title, url, created_at
            FROM bookmarks
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(db)
        .await?;
        Ok(bookmark)
    }

    pub async fn create(db: &PgPool, title: &str, url: &str) -> Result<Bookmark, ApiError> {
        let bookmark = sqlx::query_as::<_, Bookmark>(
            r#"
            INSERT INTO bookmarks (title, url)
            VALUES ($1, $2)
            RETURNING id, title, url, created_at
            "#,
        )
        .bind(title)
        .bind(url)
        .fetch_one(db)
        .await?;
        Ok(bookmark)
    }
}
