use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::error::ApiError;

/// Rating record in the database. Belongs to exactly one user and one
/// bookmark; the pair is unique.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Rating {
    pub id: Uuid,
    pub bookmark_id: Uuid,
    pub user_id: Uuid,
    pub value: i16,
    pub created_at: OffsetDateTime,
}

impl Rating {
    /// A value is valid iff 0 <= value < 11.
    pub fn validate_value(value: i16) -> Result<(), ApiError> {
        if (0..11).contains(&value) {
            Ok(())
        } else {
            Err(ApiError::validation(
                "value",
                format!("value must be between 0 and 10, got {value}"),
            ))
        }
    }

    pub async fn list(
        db: &PgPool,
        bookmark_id: Option<Uuid>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Rating>, ApiError> {
        let rows = match bookmark_id {
            Some(bookmark_id) => {
                sqlx::query_as::<_, Rating>(
                    r#"
                    SELECT id, bookmark_id, user_id, value, created_at
                    FROM ratings
                    WHERE bookmark_id = $1
                    ORDER BY created_at DESC
                    LIMIT $2 OFFSET $3
                    "#,
                )
                .bind(bookmark_id)
                .bind(limit)
                .bind(offset)
                .fetch_all(db)
                .await?
            }
            None => {
                sqlx::query_as::<_, Rating>(
                    r#"
                    SELECT id, bookmark_id, user_id, value, created_at
                    FROM ratings
                    ORDER BY created_at DESC
                    LIMIT $1 OFFSET $2
                    "#,
                )
                .bind(limit)
                .bind(offset)
                .fetch_all(db)
                .await?
            }
        };
        Ok(rows)
    }

    pub async fn find_by_id(db: &PgPool, id: Uuid) -> Result<Option<Rating>, ApiError> {
        let rating = sqlx::query_as::<_, Rating>(
            r#"
            SELECT id, bookmark_id, user_id, value, created_at
            FROM ratings
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(db)
        .await?;
        Ok(rating)
    }

    /// Inserts a rating owned by `user_id`. The INSERT itself is the
    /// uniqueness check: a concurrent duplicate loses on the
    /// (user_id, bookmark_id) index and surfaces as a conflict, so exactly
    /// one of two racing creates succeeds.
    pub async fn create(
        db: &PgPool,
        user_id: Uuid,
        bookmark_id: Uuid,
        value: i16,
    ) -> Result<Rating, ApiError> {
        let rating = sqlx::query_as::<_, Rating>(
            r#"
            INSERT INTO ratings (user_id, bookmark_id, value)
            VALUES ($1, $2, $3)
            RETURNING id, bookmark_id, user_id, value, created_at
            "#,
        )
        .bind(user_id)
        .bind(bookmark_id)
        .bind(value)
        .fetch_one(db)
        .await
        .map_err(map_create_err)?;
        Ok(rating)
    }

    pub async fn set_value(&self, db: &PgPool, value: i16) -> Result<Rating, ApiError> {
        let rating = sqlx::query_as::<_, Rating>(
            r#"
            UPDATE ratings
            SET value = $2
            WHERE id = $1
            RETURNING id, bookmark_id, user_id, value, created_at
            "#,
        )
        .bind(self.id)
        .bind(value)
        .fetch_one(db)
        .await?;
        Ok(rating)
    }

    pub async fn delete(&self, db: &PgPool) -> Result<(), ApiError> {
        sqlx::query(r#"DELETE FROM ratings WHERE id = $1"#)
            .bind(self.id)
            .execute(db)
            .await?;
        Ok(())
    }
}

fn map_create_err(e: sqlx::Error) -> ApiError {
    match &e {
        sqlx::Error::Database(db) if db.is_unique_violation() => ApiError::Conflict {
            fields: &["user", "bookmark"],
            message: "this user has already rated this bookmark".into(),
        },
        sqlx::Error::Database(db) if db.is_foreign_key_violation() => {
            ApiError::validation("bookmark_id", "bookmark does not exist")
        }
        _ => ApiError::Internal(e.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn whole_range_is_accepted() {
        for value in 0..11 {
            assert!(Rating::validate_value(value).is_ok(), "{value} should pass");
        }
    }

    #[test]
    fn out_of_range_values_are_rejected() {
        for value in [-1, 11, 12, i16::MAX, i16::MIN] {
            let err = Rating::validate_value(value).unwrap_err();
            match err {
                ApiError::Validation { field, .. } => assert_eq!(field, "value"),
                other => panic!("expected validation error, got {other:?}"),
            }
        }
    }
}
