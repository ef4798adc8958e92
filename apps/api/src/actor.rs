use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use rolegate_core::{AppError, UserId};

use crate::error::ApiError;

/// Header carrying the administrator identity performing a mutation.
pub const ACTOR_HEADER: &str = "x-rolegate-actor";

/// Acting administrator extracted from the actor header.
///
/// Authentication itself is the platform gateway's job; by the time a
/// request reaches the engine the header value is a trusted identity.
#[derive(Debug, Clone, Copy)]
pub struct Actor(pub UserId);

impl<S> FromRequestParts<S> for Actor
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let value = parts
            .headers
            .get(ACTOR_HEADER)
            .ok_or_else(|| {
                ApiError(AppError::Validation(format!(
                    "{ACTOR_HEADER} header is required"
                )))
            })?
            .to_str()
            .map_err(|_| {
                ApiError(AppError::Validation(format!(
                    "{ACTOR_HEADER} header must be valid UTF-8"
                )))
            })?;

        let actor_id = uuid::Uuid::parse_str(value).map_err(|error| {
            ApiError(AppError::Validation(format!(
                "{ACTOR_HEADER} header must be a UUID: {error}"
            )))
        })?;

        Ok(Self(UserId::from_uuid(actor_id)))
    }
}
