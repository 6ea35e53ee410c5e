//! Customer administration endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use common::CustomerId;
use domain::{Operation, SetAccountStatus};
use store::{Account, Store};

use crate::error::ApiError;
use crate::extract::{ApiJson, ApiPath, Authenticated};
use crate::state::AppState;

#[tracing::instrument(skip(state, user, cmd))]
pub async fn set_status<S: Store>(
    State(state): State<Arc<AppState<S>>>,
    user: Authenticated,
    ApiPath(id): ApiPath<CustomerId>,
    ApiJson(cmd): ApiJson<SetAccountStatus>,
) -> Result<Json<Account>, ApiError> {
    user.require(&state, Operation::SetAccountStatus)?;
    Ok(Json(state.customers.set_status(&id, cmd).await?))
}

#[tracing::instrument(skip(state, user))]
pub async fn delete<S: Store>(
    State(state): State<Arc<AppState<S>>>,
    user: Authenticated,
    ApiPath(id): ApiPath<CustomerId>,
) -> Result<StatusCode, ApiError> {
    user.require(&state, Operation::DeleteCustomer)?;
    state.customers.delete(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}
