//! Request extractors that reject with [`ApiError`] bodies.

use std::sync::Arc;

use axum::extract::{FromRequest, FromRequestParts, Path, Request};
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use domain::{Operation, Principal};
use serde::de::DeserializeOwned;
use store::Store;

use crate::error::ApiError;
use crate::state::AppState;

/// The principal behind a verified bearer token.
///
/// The token is verified and its subject re-resolved against the store on
/// every request, so deleted or disabled identities stop working at once.
#[derive(Debug, Clone)]
pub struct Authenticated(pub Principal);

impl Authenticated {
    /// Fails with `Forbidden` unless the policy admits this principal for `operation`.
    pub fn require<S: Store>(
        &self,
        state: &AppState<S>,
        operation: Operation,
    ) -> Result<(), ApiError> {
        state.policy.check(operation, &self.0)?;
        Ok(())
    }
}

/// Extracts the token from an `Authorization: Bearer <token>` header value.
pub fn bearer_token(header: &str) -> Option<&str> {
    let (scheme, token) = header.split_once(' ')?;
    let token = token.trim();
    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then_some(token)
}

impl<S: Store> FromRequestParts<Arc<AppState<S>>> for Authenticated {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState<S>>,
    ) -> Result<Self, Self::Rejection> {
        if let Some(principal) = parts.extensions.get::<Principal>() {
            return Ok(Self(principal.clone()));
        }

        let header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|h| h.to_str().ok())
            .ok_or_else(|| ApiError::Unauthorized("Missing bearer token".to_string()))?;
        let token = bearer_token(header)
            .ok_or_else(|| ApiError::Unauthorized("Invalid authorization header".to_string()))?;

        let principal = state.auth.authorize(token).await.inspect_err(|e| {
            tracing::warn!(error = %e, uri = %parts.uri, "Bearer token rejected");
        })?;

        parts.extensions.insert(principal.clone());
        Ok(Self(principal))
    }
}

/// `axum::Json` with malformed bodies reported as 400 `{"error"}`.
pub struct ApiJson<T>(pub T);

impl<T, St> FromRequest<St> for ApiJson<T>
where
    T: DeserializeOwned + Send,
    St: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &St) -> Result<Self, Self::Rejection> {
        let axum::Json(value) = axum::Json::<T>::from_request(req, state).await?;
        Ok(Self(value))
    }
}

/// `axum::extract::Path` with unparsable segments reported as 400 `{"error"}`.
pub struct ApiPath<T>(pub T);

impl<T, St> FromRequestParts<St> for ApiPath<T>
where
    T: DeserializeOwned + Send,
    St: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &St) -> Result<Self, Self::Rejection> {
        let Path(value) = Path::<T>::from_request_parts(parts, state).await?;
        Ok(Self(value))
    }
}
