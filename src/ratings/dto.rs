use serde::Deserialize;
use uuid::Uuid;

/// Request body for rating a bookmark. The owner is never part of the
/// payload; it is always the authenticated actor.
#[derive(Debug, Deserialize)]
pub struct CreateRatingRequest {
    pub bookmark_id: Uuid,
    pub value: i16,
}

/// Request body for changing a rating's value.
#[derive(Debug, Deserialize)]
pub struct SetValueRequest {
    pub value: i16,
}

#[derive(Debug, Deserialize)]
pub struct ListRatingsQuery {
    pub bookmark_id: Option<Uuid>,
    #[serde(default = "default_limit")]
    pub limit: i64,
    #[serde(default)]
    pub offset: i64,
}

fn default_limit() -> i64 {
    20
}
