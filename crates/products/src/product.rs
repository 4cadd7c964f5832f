use serde::{Deserialize, Serialize};

use warehouse_core::{ArticleId, DomainError, Entity, ProductId};

/// One bill-of-materials line: `quantity` units of article `id` per product unit.
///
/// `quantity` is always >= 1; both the constructor and deserialization enforce it.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawProductArticle")]
pub struct ProductArticle {
    pub id: ArticleId,
    quantity: i32,
}

#[derive(Deserialize)]
struct RawProductArticle {
    id: ArticleId,
    quantity: i32,
}

impl ProductArticle {
    pub fn new(id: ArticleId, quantity: i32) -> Result<Self, DomainError> {
        if quantity < 1 {
            return Err(DomainError::validation(format!(
                "article {id} quantity must be positive, got {quantity}"
            )));
        }
        Ok(Self { id, quantity })
    }

    pub fn quantity(&self) -> i32 {
        self.quantity
    }
}

impl TryFrom<RawProductArticle> for ProductArticle {
    type Error = DomainError;

    fn try_from(raw: RawProductArticle) -> Result<Self, Self::Error> {
        Self::new(raw.id, raw.quantity)
    }
}

/// A sellable item composed of a fixed, ordered bill-of-materials.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    /// Price in smallest currency unit (e.g. cents).
    pub price: i64,
    pub articles: Vec<ProductArticle>,
}

impl Product {
    pub fn new(
        id: ProductId,
        name: impl Into<String>,
        price: i64,
        articles: Vec<ProductArticle>,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            price,
            articles,
        }
    }
}

impl Entity for Product {
    type Id = ProductId;

    fn id(&self) -> ProductId {
        self.id
    }
}

/// A product plus the number of complete units assemblable from current inventory.
///
/// Derived on every read; never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProductWithStock {
    #[serde(flatten)]
    pub product: Product,
    pub stock: i32,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn rejects_zero_quantity() {
        let err = ProductArticle::new(ArticleId::new(1), 0).unwrap_err();
        match err {
            DomainError::Validation(_) => {}
            other => panic!("expected Validation, got {other:?}"),
        }
    }

    #[test]
    fn deserialization_enforces_positive_quantity() {
        let ok: ProductArticle = serde_json::from_value(json!({"id": 1, "quantity": 4})).unwrap();
        assert_eq!(ok.quantity(), 4);

        let bad = serde_json::from_value::<ProductArticle>(json!({"id": 1, "quantity": -2}));
        assert!(bad.is_err());
    }

    #[test]
    fn product_with_stock_serializes_flat() {
        let product = Product::new(
            ProductId::new(9),
            "Dining Chair",
            1500,
            vec![ProductArticle::new(ArticleId::new(1), 4).unwrap()],
        );
        let value = serde_json::to_value(ProductWithStock { product, stock: 2 }).unwrap();

        assert_eq!(
            value,
            json!({
                "id": 9,
                "name": "Dining Chair",
                "price": 1500,
                "articles": [{"id": 1, "quantity": 4}],
                "stock": 2,
            })
        );
    }
}
