//! Dish catalog endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use common::DishId;
use domain::{CreateDish, Operation, UpdateDish};
use store::{Dish, Store};

use crate::error::ApiError;
use crate::extract::{ApiJson, ApiPath, Authenticated};
use crate::state::AppState;

#[tracing::instrument(skip(state, user, cmd))]
pub async fn create<S: Store>(
    State(state): State<Arc<AppState<S>>>,
    user: Authenticated,
    ApiJson(cmd): ApiJson<CreateDish>,
) -> Result<(StatusCode, Json<Dish>), ApiError> {
    user.require(&state, Operation::CreateDish)?;
    let dish = state.catalog.create_dish(cmd).await?;
    Ok((StatusCode::CREATED, Json(dish)))
}

pub async fn list<S: Store>(
    State(state): State<Arc<AppState<S>>>,
    user: Authenticated,
) -> Result<Json<Vec<Dish>>, ApiError> {
    user.require(&state, Operation::ListDishes)?;
    Ok(Json(state.catalog.list_dishes().await?))
}

pub async fn get<S: Store>(
    State(state): State<Arc<AppState<S>>>,
    user: Authenticated,
    ApiPath(id): ApiPath<DishId>,
) -> Result<Json<Dish>, ApiError> {
    user.require(&state, Operation::GetDish)?;
    Ok(Json(state.catalog.get_dish(id).await?))
}

#[tracing::instrument(skip(state, user, patch))]
pub async fn update<S: Store>(
    State(state): State<Arc<AppState<S>>>,
    user: Authenticated,
    ApiPath(id): ApiPath<DishId>,
    ApiJson(patch): ApiJson<UpdateDish>,
) -> Result<Json<Dish>, ApiError> {
    user.require(&state, Operation::UpdateDish)?;
    Ok(Json(state.catalog.update_dish(id, patch).await?))
}

/// DELETE /dishes/{id} — also removes the orders placed for the dish.
#[tracing::instrument(skip(state, user))]
pub async fn delete<S: Store>(
    State(state): State<Arc<AppState<S>>>,
    user: Authenticated,
    ApiPath(id): ApiPath<DishId>,
) -> Result<StatusCode, ApiError> {
    user.require(&state, Operation::DeleteDish)?;
    state.catalog.delete_dish(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
