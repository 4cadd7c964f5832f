use axum::Router;

pub mod products;
pub mod system;

/// Router for the stock endpoints.
pub fn router() -> Router {
    Router::new().nest("/products", products::router())
}
