//! HTTP API application wiring (Axum router + service wiring).
//!
//! - `services.rs`: store + engine wiring (in-memory or Postgres)
//! - `routes/`: HTTP routes + handlers
//! - `dto.rs`: response DTOs
//! - `errors.rs`: consistent error responses

use std::sync::Arc;
use std::time::Duration;

use axum::{routing::get, Extension, Router};
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use crate::middleware;

pub mod dto;
pub mod errors;
pub mod routes;
pub mod services;

/// Build the full HTTP router (public entrypoint used by `main.rs`).
///
/// Every stock route runs under `request_timeout`; `/health` does not.
pub fn build_app(services: services::AppServices, request_timeout: Duration) -> Router {
    let services = Arc::new(services);
    let timeout = middleware::TimeoutState {
        limit: request_timeout,
    };

    let stock = routes::router()
        .layer(Extension(services))
        .layer(axum::middleware::from_fn_with_state(
            timeout,
            middleware::timeout_middleware,
        ));

    Router::new()
        .route("/health", get(routes::system::health))
        .merge(stock)
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()))
}
