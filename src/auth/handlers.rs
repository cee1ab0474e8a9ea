use axum::{
    extract::{FromRef, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use tracing::{info, instrument, warn};

use crate::auth::{
    dto::{AuthResponse, LoginRequest, RefreshRequest, RegisterRequest},
    extractors::AuthUser,
    jwt::JwtKeys,
    password::{hash_password, verify_password},
};
use crate::error::ApiError;
use crate::state::AppState;
use crate::users::dto::UserProfile;
use crate::users::repo::User;
use crate::users::validate;

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .route("/auth/refresh", post(refresh))
}

pub fn me_routes() -> Router<AppState> {
    Router::new().route("/me", get(get_me))
}

fn token_pair(keys: &JwtKeys, user: &User) -> anyhow::Result<(String, String)> {
    let access = keys.sign_access(user.id, user.effective_roles())?;
    let refresh = keys.sign_refresh(user.id, user.effective_roles())?;
    Ok((access, refresh))
}

#[instrument(skip(state, payload))]
pub async fn register(
    State(state): State<AppState>,
    Json(mut payload): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<AuthResponse>), ApiError> {
    payload.mail = payload.mail.trim().to_lowercase();

    validate::validate_name("login", &payload.login)?;
    validate::validate_name("firstname", &payload.firstname)?;
    validate::validate_name("lastname", &payload.lastname)?;
    validate::validate_mail(&payload.mail)?;
    validate::validate_password(&payload.password)?;

    let hash = hash_password(&payload.password)?;

    // the UNIQUE index on login decides; a duplicate maps to 409
    let user = User::create(
        &state.db,
        &payload.login,
        &hash,
        &payload.firstname,
        &payload.lastname,
        &payload.mail,
    )
    .await?;

    let keys = JwtKeys::from_ref(&state);
    let (access_token, refresh_token) = token_pair(&keys, &user)?;

    info!(user_id = %user.id, login = %user.login, "user registered");
    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            access_token,
            refresh_token,
            user: UserProfile::from(&user),
        }),
    ))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, ApiError> {
    let user = match User::find_by_login(&state.db, &payload.login).await? {
        Some(u) => u,
        None => {
            warn!(login = %payload.login, "login unknown user");
            return Err(ApiError::Unauthenticated);
        }
    };

    if !verify_password(&payload.password, &user.password_hash)? {
        warn!(login = %payload.login, user_id = %user.id, "login invalid password");
        return Err(ApiError::Unauthenticated);
    }

    let keys = JwtKeys::from_ref(&state);
    let (access_token, refresh_token) = token_pair(&keys, &user)?;

    info!(user_id = %user.id, login = %user.login, "user logged in");
    Ok(Json(AuthResponse {
        access_token,
        refresh_token,
        user: UserProfile::from(&user),
    }))
}

#[instrument(skip(state, payload))]
pub async fn refresh(
    State(state): State<AppState>,
    Json(payload): Json<RefreshRequest>,
) -> Result<Json<AuthResponse>, ApiError> {
    let keys = JwtKeys::from_ref(&state);
    let claims = keys
        .verify_refresh(&payload.refresh_token)
        .map_err(|_| ApiError::Unauthenticated)?;

    let user = User::find_by_id(&state.db, claims.sub)
        .await?
        .ok_or(ApiError::Unauthenticated)?;

    let (access_token, refresh_token) = token_pair(&keys, &user)?;

    Ok(Json(AuthResponse {
        access_token,
        refresh_token,
        user: UserProfile::from(&user),
    }))
}

#[instrument(skip(state))]
pub async fn get_me(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<UserProfile>, ApiError> {
    let user = User::find_by_id(&state.db, user_id)
        .await?
        .ok_or(ApiError::Unauthenticated)?;
    Ok(Json(UserProfile::from(&user)))
}
