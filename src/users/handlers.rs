use axum::{
    extract::{Path, Query, State},
    routing::{get, put},
    Json, Router,
};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::auth::password::hash_password;
use crate::error::ApiError;
use crate::policy::{self, Actor};
use crate::state::AppState;
use crate::users::dto::{Pagination, UpdateUserRequest, UserProfile, UserSummary};
use crate::users::repo::User;
use crate::users::validate;

pub fn read_routes() -> Router<AppState> {
    Router::new()
        .route("/users", get(list_users))
        .route("/users/:id", get(get_user))
}

pub fn write_routes() -> Router<AppState> {
    Router::new().route("/users/:id", put(update_user).patch(update_user))
}

#[instrument(skip(state))]
pub async fn list_users(
    State(state): State<AppState>,
    Query(p): Query<Pagination>,
) -> Result<Json<Vec<UserSummary>>, ApiError> {
    let users = User::list(&state.db, p.limit, p.offset).await?;
    Ok(Json(users.iter().map(UserSummary::from).collect()))
}

#[instrument(skip(state))]
pub async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<UserSummary>, ApiError> {
    let user = User::find_by_id(&state.db, id)
        .await?
        .ok_or(ApiError::NotFound("user"))?;
    Ok(Json(UserSummary::from(&user)))
}

/// Self-service profile update. Anonymous callers get 401, any other
/// authenticated user gets 403, regardless of the payload.
#[instrument(skip(state, payload))]
pub async fn update_user(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateUserRequest>,
) -> Result<Json<UserProfile>, ApiError> {
    policy::can_mutate(&actor, id)?;

    let user = User::find_by_id(&state.db, id)
        .await?
        .ok_or(ApiError::NotFound("user"))?;

    let login = payload.login.unwrap_or_else(|| user.login.clone());
    let firstname = payload.firstname.unwrap_or_else(|| user.firstname.clone());
    let lastname = payload.lastname.unwrap_or_else(|| user.lastname.clone());
    let mail = payload.mail.unwrap_or_else(|| user.mail.clone());

    validate::validate_name("login", &login)?;
    validate::validate_name("firstname", &firstname)?;
    validate::validate_name("lastname", &lastname)?;
    validate::validate_mail(&mail)?;

    let password_hash = match payload.password.as_deref() {
        Some(plain) => {
            validate::validate_password(plain)?;
            hash_password(plain)?
        }
        None => user.password_hash.clone(),
    };

    let updated = user
        .update(&state.db, &login, &password_hash, &firstname, &lastname, &mail)
        .await?;

    info!(user_id = %updated.id, "profile updated");
    Ok(Json(UserProfile::from(&updated)))
}
