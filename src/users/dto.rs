use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::users::repo::User;

/// Public projection of a user, safe for anonymous readers.
#[derive(Debug, Serialize)]
pub struct UserSummary {
    pub id: Uuid,
    pub login: String,
    pub firstname: String,
    pub lastname: String,
}

impl From<&User> for UserSummary {
    fn from(u: &User) -> Self {
        Self {
            id: u.id,
            login: u.login.clone(),
            firstname: u.firstname.clone(),
            lastname: u.lastname.clone(),
        }
    }
}

/// Owner-facing projection: adds mail and effective roles.
#[derive(Debug, Serialize)]
pub struct UserProfile {
    pub id: Uuid,
    pub login: String,
    pub firstname: String,
    pub lastname: String,
    pub mail: String,
    pub roles: Vec<String>,
}

impl From<&User> for UserProfile {
    fn from(u: &User) -> Self {
        Self {
            id: u.id,
            login: u.login.clone(),
            firstname: u.firstname.clone(),
            lastname: u.lastname.clone(),
            mail: u.mail.clone(),
            roles: u.effective_roles(),
        }
    }
}

/// Partial self-service profile update; absent fields keep their value.
#[derive(Debug, Deserialize)]
pub struct UpdateUserRequest {
    pub login: Option<String>,
    pub password: Option<String>,
    pub firstname: Option<String>,
    pub lastname: Option<String>,
    pub mail: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Pagination {
    #[serde(default = "default_limit")]
    pub limit: i64,
    #[serde(default)]
    pub offset: i64,
}

fn default_limit() -> i64 {
    20
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::OffsetDateTime;

    fn sample_user() -> User {
        User {
            id: Uuid::new_v4(),
            login: "alice".into(),
            password_hash: "$argon2id$fake".into(),
            firstname: "Alice".into(),
            lastname: "Martin".into(),
            mail: "alice@example.com".into(),
            roles: vec![],
            created_at: OffsetDateTime::UNIX_EPOCH,
        }
    }

    #[test]
    fn summary_hides_mail_and_credentials() {
        let json = serde_json::to_string(&UserSummary::from(&sample_user())).unwrap();
        assert!(json.contains("alice"));
        assert!(!json.contains("alice@example.com"));
        assert!(!json.contains("argon2"));
    }

    #[test]
    fn profile_exposes_mail_and_effective_roles() {
        let json = serde_json::to_string(&UserProfile::from(&sample_user())).unwrap();
        assert!(json.contains("alice@example.com"));
        assert!(json.contains("ROLE_USER"));
        assert!(!json.contains("argon2"));
    }
}
