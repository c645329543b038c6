//! Acting-user extraction.
//!
//! Authentication happens upstream; the engine only needs to know who acts.
//! The caller's identity arrives in the `X-Actor-Id` header and becomes the
//! operation context of the request.

use axum::{extract::FromRequestParts, http::request::Parts, response::Response};
use docflow_core::OperationContext;
use docflow_shared::AppError;
use docflow_shared::types::UserId;

use crate::error::app_error_response;

/// Header carrying the acting user's id.
pub const ACTOR_HEADER: &str = "x-actor-id";

/// The operation context of an identified caller.
///
/// ```ignore
/// async fn handler(actor: Actor) -> impl IntoResponse {
///     let ctx = actor.context();
///     // ...
/// }
/// ```
#[derive(Debug, Clone, Copy)]
pub struct Actor(pub OperationContext);

impl Actor {
    /// Returns the context for engine calls.
    #[must_use]
    pub fn context(&self) -> &OperationContext {
        &self.0
    }
}

impl<S> FromRequestParts<S> for Actor
where
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let Some(value) = parts.headers.get(ACTOR_HEADER) else {
            return Err(app_error_response(&AppError::Unauthorized(
                "X-Actor-Id header is required".to_string(),
            )));
        };

        value
            .to_str()
            .ok()
            .and_then(|raw| raw.trim().parse::<UserId>().ok())
            .map(|actor| Self(OperationContext::new(actor)))
            .ok_or_else(|| {
                app_error_response(&AppError::Unauthorized(
                    "X-Actor-Id must be a UUID".to_string(),
                ))
            })
    }
}
