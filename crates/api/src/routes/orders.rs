//! Order endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use common::OrderId;
use domain::{CreateOrder, OrderDetails, Operation, UpdateOrder};
use store::{Order, Payment, Store};

use crate::error::ApiError;
use crate::extract::{ApiJson, ApiPath, Authenticated};
use crate::state::AppState;

/// POST /orders — place an order for an available dish.
#[tracing::instrument(skip(state, user, cmd))]
pub async fn create<S: Store>(
    State(state): State<Arc<AppState<S>>>,
    user: Authenticated,
    ApiJson(cmd): ApiJson<CreateOrder>,
) -> Result<(StatusCode, Json<Order>), ApiError> {
    user.require(&state, Operation::CreateOrder)?;
    let order = state.orders.create(cmd).await?;
    Ok((StatusCode::CREATED, Json(order)))
}

/// GET /orders — all orders with their dish, customer and category.
#[tracing::instrument(skip(state, user))]
pub async fn list<S: Store>(
    State(state): State<Arc<AppState<S>>>,
    user: Authenticated,
) -> Result<Json<Vec<OrderDetails>>, ApiError> {
    user.require(&state, Operation::ListOrders)?;
    Ok(Json(state.orders.list().await?))
}

/// GET /orders/{id}
#[tracing::instrument(skip(state, user))]
pub async fn get<S: Store>(
    State(state): State<Arc<AppState<S>>>,
    user: Authenticated,
    ApiPath(id): ApiPath<OrderId>,
) -> Result<Json<OrderDetails>, ApiError> {
    user.require(&state, Operation::GetOrder)?;
    Ok(Json(state.orders.get(&id).await?))
}

/// PATCH /orders/{id} — merge fields, optionally changing the status.
#[tracing::instrument(skip(state, user, patch))]
pub async fn update<S: Store>(
    State(state): State<Arc<AppState<S>>>,
    user: Authenticated,
    ApiPath(id): ApiPath<OrderId>,
    ApiJson(patch): ApiJson<UpdateOrder>,
) -> Result<Json<Order>, ApiError> {
    user.require(&state, Operation::UpdateOrder)?;
    Ok(Json(state.orders.update(&id, patch).await?))
}

/// DELETE /orders/{id}
#[tracing::instrument(skip(state, user))]
pub async fn delete<S: Store>(
    State(state): State<Arc<AppState<S>>>,
    user: Authenticated,
    ApiPath(id): ApiPath<OrderId>,
) -> Result<StatusCode, ApiError> {
    user.require(&state, Operation::DeleteOrder)?;
    state.orders.remove(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /orders/{id}/payments — payment attempts made against an order.
#[tracing::instrument(skip(state, user))]
pub async fn payments<S: Store>(
    State(state): State<Arc<AppState<S>>>,
    user: Authenticated,
    ApiPath(id): ApiPath<OrderId>,
) -> Result<Json<Vec<Payment>>, ApiError> {
    user.require(&state, Operation::ListOrderPayments)?;
    Ok(Json(state.payments.list_for_order(&id).await?))
}
