//! Stock orchestration (application-level).
//!
//! `StockEngine` composes an `ArticleStore` and a `ProductStore` and exposes the
//! two operations the transport needs:
//!
//! ```text
//! products_with_stock()
//!   ↓
//! 1. List products and articles (concurrently, independent snapshots)
//!   ↓
//! 2. Join by article id and derive per-product stock (pure, in memory)
//!
//! remove_product(id, quantity)
//!   ↓
//! 1. Load the product (NotFound propagates)
//!   ↓
//! 2. Scale its bill-of-materials by `quantity` (pure)
//!   ↓
//! 3. Issue the whole batch as one atomic decrement (skipped when empty)
//! ```
//!
//! The engine holds no mutable state; all shared state lives in the stores, so
//! one instance can serve any number of concurrent requests.
//!
//! ## Cancellation
//!
//! Dropping a returned future cancels the operation. Stores apply a decrement
//! batch atomically, so a cancelled removal either committed entirely or not at
//! all.
//!
//! ## Oversell
//!
//! `remove_product` does not check availability before decrementing; selling
//! more than is in stock drives article stock negative.

use thiserror::Error;
use tracing::instrument;

use warehouse_core::{DomainError, ProductId};
use warehouse_products::{ProductWithStock, decrement_batch, with_stock};

use crate::store::{ArticleStore, ProductStore, StoreError};

#[derive(Debug, Error)]
pub enum StockError {
    /// The requested product does not exist.
    #[error("{0}")]
    NotFound(String),
    /// The request itself is invalid (e.g. non-positive quantity).
    #[error("validation failed: {0}")]
    Validation(String),
    /// A store read or write failed.
    #[error("failed to {context}: {source}")]
    Store {
        context: &'static str,
        #[source]
        source: StoreError,
    },
}

impl StockError {
    /// Wrap a store error with the operation it interrupted.
    ///
    /// `NotFound` stays distinguishable so callers can surface it as a client error.
    fn store(context: &'static str, source: StoreError) -> Self {
        match source {
            StoreError::NotFound { entity, id } => {
                StockError::NotFound(format!("failed to {context}: {entity} {id} not found"))
            }
            source => StockError::Store { context, source },
        }
    }
}

impl From<DomainError> for StockError {
    fn from(value: DomainError) -> Self {
        match value {
            DomainError::Validation(msg) | DomainError::InvalidId(msg) => {
                StockError::Validation(msg)
            }
        }
    }
}

/// Stateless stock engine over an article store and a product store.
#[derive(Debug, Clone)]
pub struct StockEngine<A, P> {
    articles: A,
    products: P,
}

impl<A, P> StockEngine<A, P> {
    pub fn new(articles: A, products: P) -> Self {
        Self { articles, products }
    }

    pub fn articles(&self) -> &A {
        &self.articles
    }

    pub fn products(&self) -> &P {
        &self.products
    }
}

impl<A, P> StockEngine<A, P>
where
    A: ArticleStore,
    P: ProductStore,
{
    /// Every product with its currently assemblable stock, in product-store order.
    ///
    /// Fails as a whole if either read fails.
    #[instrument(skip(self), err)]
    pub async fn products_with_stock(&self) -> Result<Vec<ProductWithStock>, StockError> {
        let (products, articles) = tokio::try_join!(
            async {
                self.products
                    .list_products()
                    .await
                    .map_err(|e| StockError::store("get products", e))
            },
            async {
                self.articles
                    .list_articles()
                    .await
                    .map_err(|e| StockError::store("get articles", e))
            },
        )?;

        let items = with_stock(products, &articles);
        tracing::debug!(products = items.len(), articles = articles.len(), "derived product stock");
        Ok(items)
    }

    /// Remove `quantity` units of a product from inventory.
    #[instrument(skip(self), fields(product_id = %product_id), err)]
    pub async fn remove_product(
        &self,
        product_id: ProductId,
        quantity: i32,
    ) -> Result<(), StockError> {
        let product = self
            .products
            .get_product(product_id)
            .await
            .map_err(|e| StockError::store("get product", e))?;

        let batch = decrement_batch(&product, quantity)?;
        if batch.is_empty() {
            tracing::debug!("product has no articles; nothing to decrement");
            return Ok(());
        }

        let updated = self
            .articles
            .decrement_stock(&batch)
            .await
            .map_err(|e| StockError::store("decrement stock", e))?;

        tracing::info!(lines = batch.len(), updated, "removed product from stock");
        Ok(())
    }
}
