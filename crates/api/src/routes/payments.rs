//! Payment endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use common::PayCode;
use domain::{InitiatePayment, Operation, UpdatePaymentStatus};
use store::{Payment, Store};

use crate::error::ApiError;
use crate::extract::{ApiJson, ApiPath, Authenticated};
use crate::state::AppState;

/// POST /payments/initiate — start a payment attempt for an unpaid order.
#[tracing::instrument(skip(state, user, cmd))]
pub async fn initiate<S: Store>(
    State(state): State<Arc<AppState<S>>>,
    user: Authenticated,
    ApiJson(cmd): ApiJson<InitiatePayment>,
) -> Result<(StatusCode, Json<Payment>), ApiError> {
    user.require(&state, Operation::InitiatePayment)?;
    let payment = state.payments.initiate(cmd).await?;
    Ok((StatusCode::CREATED, Json(payment)))
}

/// PATCH /payments/webhook/{payCode} — record the provider outcome.
#[tracing::instrument(skip(state, user, cmd))]
pub async fn webhook<S: Store>(
    State(state): State<Arc<AppState<S>>>,
    user: Authenticated,
    ApiPath(code): ApiPath<PayCode>,
    ApiJson(cmd): ApiJson<UpdatePaymentStatus>,
) -> Result<Json<Payment>, ApiError> {
    user.require(&state, Operation::UpdatePaymentStatus)?;
    Ok(Json(state.payments.update_status(&code, cmd).await?))
}

/// GET /payments/{payCode}
#[tracing::instrument(skip(state, user))]
pub async fn get<S: Store>(
    State(state): State<Arc<AppState<S>>>,
    user: Authenticated,
    ApiPath(code): ApiPath<PayCode>,
) -> Result<Json<Payment>, ApiError> {
    user.require(&state, Operation::GetPayment)?;
    Ok(Json(state.payments.get(&code).await?))
}

/// GET /payments
#[tracing::instrument(skip(state, user))]
pub async fn list<S: Store>(
    State(state): State<Arc<AppState<S>>>,
    user: Authenticated,
) -> Result<Json<Vec<Payment>>, ApiError> {
    user.require(&state, Operation::ListPayments)?;
    Ok(Json(state.payments.list().await?))
}
