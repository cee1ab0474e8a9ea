use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use tracing::warn;
use uuid::Uuid;

use crate::auth::claims::TokenKind;
use crate::auth::jwt::JwtKeys;
use crate::error::ApiError;
use crate::policy::Actor;
use crate::state::AppState;

fn bearer_token(parts: &Parts) -> Option<&str> {
    let auth = parts
        .headers
        .get(axum::http::header::AUTHORIZATION)?
        .to_str()
        .ok()?;
    auth.strip_prefix("Bearer ")
        .or_else(|| auth.strip_prefix("bearer "))
}

/// Resolves the request principal. A missing Authorization header yields
/// `Actor::Anonymous`; a header carrying an invalid or non-access token is
/// rejected outright.
#[async_trait]
impl FromRequestParts<AppState> for Actor {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let Some(token) = bearer_token(parts) else {
            return Ok(Actor::Anonymous);
        };

        let keys = JwtKeys::from_ref(state);
        let claims = keys.verify(token).map_err(|_| {
            warn!("invalid or expired token");
            ApiError::Unauthenticated
        })?;

        if claims.kind != TokenKind::Access {
            return Err(ApiError::Unauthenticated);
        }

        Ok(Actor::Authenticated(claims.sub))
    }
}

/// Extracts and validates the JWT, returning the user ID. Use where a route
/// requires authentication unconditionally.
#[derive(Debug)]
pub struct AuthUser(pub Uuid);

#[async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        match Actor::from_request_parts(parts, state).await? {
            Actor::Authenticated(id) => Ok(AuthUser(id)),
            Actor::Anonymous => Err(ApiError::Unauthenticated),
        }
    }
}
