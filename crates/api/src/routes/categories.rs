//! Category endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use domain::{CreateCategory, Operation};
use store::{Category, Store};

use crate::error::ApiError;
use crate::extract::{ApiJson, Authenticated};
use crate::state::AppState;

#[tracing::instrument(skip(state, user, cmd))]
pub async fn create<S: Store>(
    State(state): State<Arc<AppState<S>>>,
    user: Authenticated,
    ApiJson(cmd): ApiJson<CreateCategory>,
) -> Result<(StatusCode, Json<Category>), ApiError> {
    user.require(&state, Operation::CreateCategory)?;
    let category = state.catalog.create_category(cmd).await?;
    Ok((StatusCode::CREATED, Json(category)))
}

pub async fn list<S: Store>(
    State(state): State<Arc<AppState<S>>>,
    user: Authenticated,
) -> Result<Json<Vec<Category>>, ApiError> {
    user.require(&state, Operation::ListCategories)?;
    Ok(Json(state.catalog.list_categories().await?))
}
