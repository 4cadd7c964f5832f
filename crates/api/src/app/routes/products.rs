use std::sync::Arc;

use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};

use warehouse_core::ProductId;

use crate::app::{dto, errors};
use crate::app::services::AppServices;

/// Units removed per `remove` call.
const REMOVE_QUANTITY: i32 = 1;

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_products))
        .route("/:id/remove", post(remove_product))
}

pub async fn list_products(
    Extension(services): Extension<Arc<AppServices>>,
) -> axum::response::Response {
    match services.products_with_stock().await {
        Ok(items) => (StatusCode::OK, Json(dto::ProductListResponse::from(items))).into_response(),
        Err(e) => errors::stock_error_to_response(e),
    }
}

pub async fn remove_product(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let product_id: ProductId = match id.parse() {
        Ok(v) => v,
        Err(_) => return errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid product id"),
    };

    match services.remove_product(product_id, REMOVE_QUANTITY).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => errors::stock_error_to_response(e),
    }
}
