use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

use warehouse_infra::StockError;

pub fn stock_error_to_response(err: StockError) -> axum::response::Response {
    match err {
        StockError::NotFound(msg) => json_error(StatusCode::NOT_FOUND, "not_found", msg),
        StockError::Validation(msg) => {
            json_error(StatusCode::BAD_REQUEST, "validation_error", msg)
        }
        err @ StockError::Store { .. } => {
            tracing::error!(error = %err, "stock operation failed");
            json_error(StatusCode::INTERNAL_SERVER_ERROR, "store_error", err.to_string())
        }
    }
}

pub fn json_error(
    status: StatusCode,
    code: &'static str,
    message: impl Into<String>,
) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}
