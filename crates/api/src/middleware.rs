//! Request middleware: per-request deadline for the stock routes.

use std::time::Duration;

use axum::{
    extract::State,
    http::StatusCode,
    middleware::Next,
    response::Response,
};

use crate::app::errors;

#[derive(Debug, Clone, Copy)]
pub struct TimeoutState {
    pub limit: Duration,
}

/// Answer 504 once `limit` elapses; the in-flight handler future is dropped.
pub async fn timeout_middleware(
    State(state): State<TimeoutState>,
    req: axum::http::Request<axum::body::Body>,
    next: Next,
) -> Response {
    let path = req.uri().path().to_owned();

    match tokio::time::timeout(state.limit, next.run(req)).await {
        Ok(response) => response,
        Err(_) => {
            tracing::warn!(%path, limit_ms = state.limit.as_millis() as u64, "request timed out");
            errors::json_error(
                StatusCode::GATEWAY_TIMEOUT,
                "timeout",
                format!("request exceeded {}ms", state.limit.as_millis()),
            )
        }
    }
}
