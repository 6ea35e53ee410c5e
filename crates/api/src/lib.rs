//! HTTP API server for the canteen ordering platform.
//!
//! Provides REST endpoints for registration and login, orders, payments,
//! the dish catalog, staff users and customer administration, with
//! structured logging (tracing) and Prometheus metrics. Every data endpoint
//! except register and login needs a bearer token; role checks go through
//! [`domain::AccessPolicy`].

pub mod config;
pub mod error;
pub mod extract;
pub mod routes;
pub mod state;

use std::sync::Arc;

use axum::Router;
use axum::routing::{delete, get, patch, post};
use metrics_exporter_prometheus::PrometheusHandle;
use store::Store;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub use state::AppState;

/// Creates the Axum application router with all routes and shared state.
pub fn create_app<S: Store>(state: Arc<AppState<S>>, metrics_handle: PrometheusHandle) -> Router {
    use routes::{auth, categories, customers, dishes, orders, payments, system, users};

    let metrics_router = Router::new()
        .route("/metrics", get(system::metrics))
        .with_state(metrics_handle);

    Router::new()
        .route("/health", get(system::health))
        .route("/auth/register", post(auth::register::<S>))
        .route("/auth/login", post(auth::login::<S>))
        .route("/orders", post(orders::create::<S>).get(orders::list::<S>))
        .route(
            "/orders/{id}",
            get(orders::get::<S>)
                .patch(orders::update::<S>)
                .delete(orders::delete::<S>),
        )
        .route("/orders/{id}/payments", get(orders::payments::<S>))
        .route("/payments", get(payments::list::<S>))
        .route("/payments/initiate", post(payments::initiate::<S>))
        .route("/payments/webhook/{pay_code}", patch(payments::webhook::<S>))
        .route("/payments/{pay_code}", get(payments::get::<S>))
        .route("/dishes", post(dishes::create::<S>).get(dishes::list::<S>))
        .route(
            "/dishes/{id}",
            get(dishes::get::<S>)
                .patch(dishes::update::<S>)
                .delete(dishes::delete::<S>),
        )
        .route(
            "/categories",
            post(categories::create::<S>).get(categories::list::<S>),
        )
        .route("/users", post(users::create::<S>).get(users::list::<S>))
        .route(
            "/users/{id}",
            get(users::get::<S>)
                .patch(users::update::<S>)
                .delete(users::delete::<S>),
        )
        .route("/customers/{id}", delete(customers::delete::<S>))
        .route("/customers/{id}/status", patch(customers::set_status::<S>))
        .with_state(state)
        .merge(metrics_router)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
}
