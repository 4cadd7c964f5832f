use serde::Serialize;

use warehouse_products::ProductWithStock;

// -------------------------
// Response DTOs
// -------------------------

/// `GET /products` body: every product with its derived stock, in id order.
///
/// Each item is `{id, name, price, articles: [{id, quantity}], stock}`.
#[derive(Debug, Serialize)]
pub struct ProductListResponse {
    pub items: Vec<ProductWithStock>,
}

impl From<Vec<ProductWithStock>> for ProductListResponse {
    fn from(items: Vec<ProductWithStock>) -> Self {
        Self { items }
    }
}
