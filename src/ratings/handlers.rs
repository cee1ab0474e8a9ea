use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    routing::{get, post, put},
    Json, Router,
};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::error::ApiError;
use crate::policy::{self, Actor};
use crate::ratings::dto::{CreateRatingRequest, ListRatingsQuery, SetValueRequest};
use crate::ratings::repo::Rating;
use crate::state::AppState;

pub fn read_routes() -> Router<AppState> {
    Router::new()
        .route("/ratings", get(list_ratings))
        .route("/ratings/:id", get(get_rating))
}

pub fn write_routes() -> Router<AppState> {
    Router::new()
        .route("/ratings", post(create_rating))
        .route(
            "/ratings/:id",
            put(update_rating).patch(update_rating).delete(delete_rating),
        )
}

#[instrument(skip(state))]
pub async fn list_ratings(
    State(state): State<AppState>,
    Query(q): Query<ListRatingsQuery>,
) -> Result<Json<Vec<Rating>>, ApiError> {
    let ratings = Rating::list(&state.db, q.bookmark_id, q.limit, q.offset).await?;
    Ok(Json(ratings))
}

#[instrument(skip(state))]
pub async fn get_rating(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Rating>, ApiError> {
    let rating = Rating::find_by_id(&state.db, id)
        .await?
        .ok_or(ApiError::NotFound("rating"))?;
    Ok(Json(rating))
}

#[instrument(skip(state, payload))]
pub async fn create_rating(
    State(state): State<AppState>,
    actor: Actor,
    Json(payload): Json<CreateRatingRequest>,
) -> Result<(StatusCode, HeaderMap, Json<Rating>), ApiError> {
    let user_id = policy::can_create(&actor)?;
    Rating::validate_value(payload.value)?;

    let rating = Rating::create(&state.db, user_id, payload.bookmark_id, payload.value).await?;

    let mut headers = HeaderMap::new();
    headers.insert(
        axum::http::header::LOCATION,
        format!("/api/ratings/{}", rating.id).parse().unwrap(),
    );

    info!(rating_id = %rating.id, %user_id, bookmark_id = %rating.bookmark_id, "rating created");
    Ok((StatusCode::CREATED, headers, Json(rating)))
}

#[instrument(skip(state, payload))]
pub async fn update_rating(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<Uuid>,
    Json(payload): Json<SetValueRequest>,
) -> Result<Json<Rating>, ApiError> {
    let rating = Rating::find_by_id(&state.db, id)
        .await?
        .ok_or(ApiError::NotFound("rating"))?;

    if let Err(e) = policy::can_mutate(&actor, rating.user_id) {
        warn!(rating_id = %id, owner = %rating.user_id, "rating update rejected");
        return Err(e);
    }
    Rating::validate_value(payload.value)?;

    let updated = rating.set_value(&state.db, payload.value).await?;
    Ok(Json(updated))
}

#[instrument(skip(state))]
pub async fn delete_rating(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    let rating = Rating::find_by_id(&state.db, id)
        .await?
        .ok_or(ApiError::NotFound("rating"))?;

    if let Err(e) = policy::can_mutate(&actor, rating.user_id) {
        warn!(rating_id = %id, owner = %rating.user_id, "rating delete rejected");
        return Err(e);
    }

    rating.delete(&state.db).await?;
    info!(rating_id = %id, "rating deleted");
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod ownership_flow_tests {
    //! Walks the full guard chain the write handlers run (policy, then value
    //! validation, then the unique (user, bookmark) pair) against an
    //! in-memory stand-in for the ratings table.

    use std::collections::HashSet;

    use axum::http::StatusCode;
    use uuid::Uuid;

    use crate::error::ApiError;
    use crate::policy::{self, Actor};
    use crate::ratings::repo::Rating;

    struct PairSet(HashSet<(Uuid, Uuid)>);

    impl PairSet {
        fn insert(&mut self, user_id: Uuid, bookmark_id: Uuid) -> Result<(), ApiError> {
            if !self.0.insert((user_id, bookmark_id)) {
                return Err(ApiError::Conflict {
                    fields: &["user", "bookmark"],
                    message: "this user has already rated this bookmark".into(),
                });
            }
            Ok(())
        }
    }

    fn try_create(
        pairs: &mut PairSet,
        actor: &Actor,
        bookmark_id: Uuid,
        value: i16,
    ) -> Result<Uuid, ApiError> {
        let user_id = policy::can_create(actor)?;
        Rating::validate_value(value)?;
        pairs.insert(user_id, bookmark_id)?;
        Ok(user_id)
    }

    #[test]
    fn rating_lifecycle_guards() {
        let u1 = Uuid::new_v4();
        let u2 = Uuid::new_v4();
        let bookmark = Uuid::new_v4();
        let mut pairs = PairSet(HashSet::new());

        // U1 rates the bookmark with 5
        let owner = try_create(&mut pairs, &Actor::Authenticated(u1), bookmark, 5)
            .expect("first create succeeds");
        assert_eq!(owner, u1);

        // U1 may change the value to 7
        assert!(policy::can_mutate(&Actor::Authenticated(u1), owner).is_ok());
        assert!(Rating::validate_value(7).is_ok());

        // U2 may not touch it
        let err = policy::can_mutate(&Actor::Authenticated(u2), owner).unwrap_err();
        assert_eq!(err.status(), StatusCode::FORBIDDEN);

        // anonymous callers may not either
        let err = policy::can_mutate(&Actor::Anonymous, owner).unwrap_err();
        assert_eq!(err.status(), StatusCode::UNAUTHORIZED);

        // a second rating by U1 for the same bookmark conflicts, whatever
        // the value
        let err = try_create(&mut pairs, &Actor::Authenticated(u1), bookmark, 9).unwrap_err();
        assert_eq!(err.status(), StatusCode::CONFLICT);
        assert_eq!(pairs.0.len(), 1);

        // U2 rating the same bookmark is fine
        try_create(&mut pairs, &Actor::Authenticated(u2), bookmark, 3)
            .expect("distinct owner may rate");
        assert_eq!(pairs.0.len(), 2);
    }

    #[test]
    fn invalid_value_is_rejected_before_the_store_is_touched() {
        let u1 = Uuid::new_v4();
        let bookmark = Uuid::new_v4();
        let mut pairs = PairSet(HashSet::new());

        let err = try_create(&mut pairs, &Actor::Authenticated(u1), bookmark, 11).unwrap_err();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert!(pairs.0.is_empty());
    }
}
