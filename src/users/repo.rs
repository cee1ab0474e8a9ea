use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::error::ApiError;

/// Role granted implicitly to every authenticated user.
pub const BASE_ROLE: &str = "ROLE_USER";

/// User record in the database.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: Uuid,
    pub login: String,
    #[serde(skip_serializing)]
    pub password_hash: String, // argon2 hash, never exposed in JSON
    pub firstname: String,
    pub lastname: String,
    pub mail: String,
    pub roles: Vec<String>,
    pub created_at: OffsetDateTime,
}

impl User {
    /// Stored roles plus the implicit base role, deduplicated. Never empty.
    pub fn effective_roles(&self) -> Vec<String> {
        let mut roles: Vec<String> = Vec::with_capacity(self.roles.len() + 1);
        for role in &self.roles {
            if !roles.contains(role) {
                roles.push(role.clone());
            }
        }
        if !roles.iter().any(|r| r == BASE_ROLE) {
            roles.push(BASE_ROLE.to_string());
        }
        roles
    }

    pub async fn find_by_login(db: &PgPool, login: &str) -> Result<Option<User>, ApiError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, login, password_hash, firstname, lastname, mail, roles, created_at
            FROM users
            WHERE login = $1
            "#,
        )
        .bind(login)
        .fetch_optional(db)
        .await?;
        Ok(user)
    }

    pub async fn find_by_id(db: &PgPool, id: Uuid) -> Result<Option<User>, ApiError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, login, password_hash, firstname, lastname, mail, roles, created_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(db)
        .await?;
        Ok(user)
    }

    pub async fn list(db: &PgPool, limit: i64, offset: i64) -> Result<Vec<User>, ApiError> {
        let rows = sqlx::query_as::<_, User>(
            r#"
            SELECT id, login, password_hash, firstname, lastname, mail, roles, created_at
            FROM users
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

    pub async fn create(
        db: &PgPool,
        login: &str,
        password_hash: &str,
        firstname: &str,
        lastname: &str,
        mail: &str,
    ) -> Result<User, ApiError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (login, password_hash, firstname, lastname, mail)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, login, password_hash, firstname, lastname, mail, roles, created_at
            "#,
        )
        .bind(login)
        .bind(password_hash)
        .bind(firstname)
        .bind(lastname)
        .bind(mail)
        .fetch_one(db)
        .await
        .map_err(map_login_conflict)?;
        Ok(user)
    }

    /// Full-row profile update; callers merge partial input with the current
    /// record first.
    pub async fn update(
        &self,
        db: &PgPool,
        login: &str,
        password_hash: &str,
        firstname: &str,
        lastname: &str,
        mail: &str,
    ) -> Result<User, ApiError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            UPDATE users
            SET login = $2, password_hash = $3, firstname = $4, lastname = $5, mail = $6
            WHERE id = $1
            RETURNING id, login, password_hash, firstname, lastname, mail, roles, created_at
            "#,
        )
        .bind(self.id)
        .bind(login)
        .bind(password_hash)
        .bind(firstname)
        .bind(lastname)
        .bind(mail)
        .fetch_one(db)
        .await
        .map_err(map_login_conflict)?;
        Ok(user)
    }
}

/// The UNIQUE index on `login` is the authoritative check; a violation there
/// surfaces as a client conflict, anything else as an internal error.
fn map_login_conflict(e: sqlx::Error) -> ApiError {
    match &e {
        sqlx::Error::Database(db) if db.is_unique_violation() => ApiError::Conflict {
            fields: &["login"],
            message: "login is already taken".into(),
        },
        _ => ApiError::Internal(e.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user_with_roles(roles: Vec<String>) -> User {
        User {
            id: Uuid::new_v4(),
            login: "alice".into(),
            password_hash: "$argon2id$fake".into(),
            firstname: "Alice".into(),
            lastname: "Martin".into(),
            mail: "alice@example.com".into(),
            roles,
            created_at: OffsetDateTime::UNIX_EPOCH,
        }
    }

    #[test]
    fn effective_roles_always_contains_base_role() {
        let user = user_with_roles(vec![]);
        assert_eq!(user.effective_roles(), vec![BASE_ROLE.to_string()]);
    }

    #[test]
    fn effective_roles_deduplicates() {
        let user = user_with_roles(vec![
            "ROLE_ADMIN".into(),
            "ROLE_ADMIN".into(),
            "ROLE_USER".into(),
        ]);
        assert_eq!(
            user.effective_roles(),
            vec!["ROLE_ADMIN".to_string(), "ROLE_USER".to_string()]
        );
    }

    #[test]
    fn effective_roles_is_idempotent() {
        let user = user_with_roles(vec!["ROLE_ADMIN".into()]);
        assert_eq!(user.effective_roles(), user.effective_roles());
    }

    #[test]
    fn password_hash_never_serializes() {
        let user = user_with_roles(vec![]);
        let json = serde_json::to_string(&user).expect("serialize user");
        assert!(!json.contains("password_hash"));
        assert!(!json.contains("argon2"));
    }
}
