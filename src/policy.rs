use uuid::Uuid;

use crate::error::ApiError;

/// Principal attached to a request: either an authenticated user or the
/// anonymous marker. Produced by the `Actor` extractor in `auth::extractors`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Actor {
    Anonymous,
    Authenticated(Uuid),
}

impl Actor {
    pub fn id(&self) -> Option<Uuid> {
        match self {
            Self::Anonymous => None,
            Self::Authenticated(id) => Some(*id),
        }
    }
}

/// Creating an owned record only requires authentication; the owner of the
/// new record is always the actor itself, never caller-supplied.
pub fn can_create(actor: &Actor) -> Result<Uuid, ApiError> {
    actor.id().ok_or(ApiError::Unauthenticated)
}

/// Updating or deleting an owned record requires the actor to be its owner.
/// Roles never elevate here: a mismatched owner is rejected regardless of
/// what the actor is granted elsewhere.
pub fn can_mutate(actor: &Actor, owner_id: Uuid) -> Result<(), ApiError> {
    match actor {
        Actor::Anonymous => Err(ApiError::Unauthenticated),
        Actor::Authenticated(id) if *id == owner_id => Ok(()),
        Actor::Authenticated(_) => Err(ApiError::Forbidden),
    }
}
