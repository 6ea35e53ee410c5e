//! Registration and login. These are the only data endpoints without a token.

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use domain::{Login, RegisterCustomer};
use serde::Serialize;
use store::Store;

use crate::error::ApiError;
use crate::extract::ApiJson;
use crate::state::AppState;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisteredResponse {
    pub message: String,
    pub customer_id: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenResponse {
    pub access_token: String,
}

/// POST /auth/register — create a customer and its account.
#[tracing::instrument(skip(state, cmd))]
pub async fn register<S: Store>(
    State(state): State<Arc<AppState<S>>>,
    ApiJson(cmd): ApiJson<RegisterCustomer>,
) -> Result<(StatusCode, Json<RegisteredResponse>), ApiError> {
    let registration = state.auth.register(cmd).await?;

    Ok((
        StatusCode::CREATED,
        Json(RegisteredResponse {
            message: "Registration successful".to_string(),
            customer_id: registration.customer.id.into_inner(),
        }),
    ))
}

/// POST /auth/login — exchange credentials for a bearer token.
#[tracing::instrument(skip(state, cmd))]
pub async fn login<S: Store>(
    State(state): State<Arc<AppState<S>>>,
    ApiJson(cmd): ApiJson<Login>,
) -> Result<Json<TokenResponse>, ApiError> {
    let access_token = state.auth.login(cmd).await?;
    Ok(Json(TokenResponse { access_token }))
}
