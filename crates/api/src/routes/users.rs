//! Staff user management endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use common::StaffId;
use domain::{CreateStaff, Operation, UpdateStaff};
use store::{StaffUser, Store};

use crate::error::ApiError;
use crate::extract::{ApiJson, ApiPath, Authenticated};
use crate::state::AppState;

#[tracing::instrument(skip(state, user, cmd))]
pub async fn create<S: Store>(
    State(state): State<Arc<AppState<S>>>,
    user: Authenticated,
    ApiJson(cmd): ApiJson<CreateStaff>,
) -> Result<(StatusCode, Json<StaffUser>), ApiError> {
    user.require(&state, Operation::CreateStaff)?;
    let created = state.staff.create(cmd).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn list<S: Store>(
    State(state): State<Arc<AppState<S>>>,
    user: Authenticated,
) -> Result<Json<Vec<StaffUser>>, ApiError> {
    user.require(&state, Operation::ListStaff)?;
    Ok(Json(state.staff.list().await?))
}

pub async fn get<S: Store>(
    State(state): State<Arc<AppState<S>>>,
    user: Authenticated,
    ApiPath(id): ApiPath<StaffId>,
) -> Result<Json<StaffUser>, ApiError> {
    user.require(&state, Operation::GetStaff)?;
    Ok(Json(state.staff.get(id).await?))
}

#[tracing::instrument(skip(state, user, patch))]
pub async fn update<S: Store>(
    State(state): State<Arc<AppState<S>>>,
    user: Authenticated,
    ApiPath(id): ApiPath<StaffId>,
    ApiJson(patch): ApiJson<UpdateStaff>,
) -> Result<Json<StaffUser>, ApiError> {
    user.require(&state, Operation::UpdateStaff)?;
    Ok(Json(state.staff.update(id, patch).await?))
}

#[tracing::instrument(skip(state, user))]
pub async fn delete<S: Store>(
    State(state): State<Arc<AppState<S>>>,
    user: Authenticated,
    ApiPath(id): ApiPath<StaffId>,
) -> Result<StatusCode, ApiError> {
    user.require(&state, Operation::DeleteStaff)?;
    state.staff.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
