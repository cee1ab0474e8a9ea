use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    routing::{get, post},
    Json, Router,
};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::bookmarks::dto::{CreateBookmarkRequest, Pagination};
use crate::bookmarks::repo::Bookmark;
use crate::error::ApiError;
use crate::policy::{self, Actor};
use crate::state::AppState;
use crate::users::validate;

pub fn read_routes() -> Router<AppState> {
    Router::new()
        .route("/bookmarks", get(list_bookmarks))
        .route("/bookmarks/:id", get(get_bookmark))
}

pub fn write_routes() -> Router<AppState> {
    Router::new().route("/bookmarks", post(create_bookmark))
}

#[instrument(skip(state))]
pub async fn list_bookmarks(
    State(state): State<AppState>,
    Query(p): Query<Pagination>,
) -> Result<Json<Vec<Bookmark>>, ApiError> {
    let bookmarks = Bookmark::list(&state.db, p.limit, p.offset).await?;
    Ok(Json(bookmarks))
}

#[instrument(skip(state))]
pub async fn get_bookmark(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Bookmark>, ApiError> {
    let bookmark = Bookmark::find_by_id(&state.db, id)
        .await?
        .ok_or(ApiError::NotFound("bookmark"))?;
    Ok(Json(bookmark))
}

#[instrument(skip(state, payload))]
pub async fn create_bookmark(
    State(state): State<AppState>,
    actor: Actor,
    Json(payload): Json<CreateBookmarkRequest>,
) -> Result<(StatusCode, HeaderMap, Json<Bookmark>), ApiError> {
    let user_id = policy::can_create(&actor)?;

    validate::validate_name("title", &payload.title)?;
    if payload.url.trim().is_empty() {
        return Err(ApiError::validation("url", "url must not be empty"));
    }

    let bookmark = Bookmark::create(&state.db, &payload.title, &payload.url).await?;

    let mut headers = HeaderMap::new();
    headers.insert(
        axum::http::header::LOCATION,
        format!("/api/bookmarks/{}", bookmark.id).parse().unwrap(),
    );

    info!(bookmark_id = %bookmark.id, %user_id, "bookmark created");
    Ok((StatusCode::CREATED, headers, Json(bookmark)))
}
