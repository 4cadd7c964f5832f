//! Article and product storage contracts.
//!
//! The stock engine depends only on these traits. Two implementations exist:
//!
//! - `in_memory`: lock-protected maps for tests/dev
//! - `postgres`: SQLx-backed tables for production
//!
//! ## Atomic decrement
//!
//! `ArticleStore::decrement_stock` applies a whole batch or nothing. Unknown
//! article ids are ignored (they match no row) and the remaining lines are
//! still applied. Stock is never clamped at zero.

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use warehouse_core::{ArticleId, ProductId};
use warehouse_inventory::{Article, ArticleDecrement};
use warehouse_products::Product;

pub mod in_memory;
pub mod postgres;

pub use in_memory::{InMemoryArticleStore, InMemoryProductStore};
pub use postgres::{PostgresArticleStore, PostgresProductStore};

/// Store operation error.
///
/// These are **infrastructure errors** (storage, decoding) plus the one
/// lookup outcome callers must distinguish: a missing entity.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: i32 },

    #[error("failed to decode row: {0}")]
    Decode(String),

    #[error("storage error: {0}")]
    Storage(String),
}

impl StoreError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound { .. })
    }
}

/// Read/decrement access to article inventory.
#[async_trait]
pub trait ArticleStore: Send + Sync {
    /// All articles ordered by id (empty when none exist).
    async fn list_articles(&self) -> Result<Vec<Article>, StoreError>;

    /// A single article, or `StoreError::NotFound`.
    async fn get_article(&self, id: ArticleId) -> Result<Article, StoreError>;

    /// Atomically subtract every line of `batch` from article stock.
    ///
    /// Returns the number of articles updated.
    async fn decrement_stock(&self, batch: &[ArticleDecrement]) -> Result<u64, StoreError>;
}

/// Read access to the product catalog.
#[async_trait]
pub trait ProductStore: Send + Sync {
    /// All products ordered by id (empty when none exist).
    async fn list_products(&self) -> Result<Vec<Product>, StoreError>;

    /// A single product, or `StoreError::NotFound`.
    async fn get_product(&self, id: ProductId) -> Result<Product, StoreError>;
}

#[async_trait]
impl<S> ArticleStore for Arc<S>
where
    S: ArticleStore + ?Sized,
{
    async fn list_articles(&self) -> Result<Vec<Article>, StoreError> {
        (**self).list_articles().await
    }

    async fn get_article(&self, id: ArticleId) -> Result<Article, StoreError> {
        (**self).get_article(id).await
    }

    async fn decrement_stock(&self, batch: &[ArticleDecrement]) -> Result<u64, StoreError> {
        (**self).decrement_stock(batch).await
    }
}

#[async_trait]
impl<S> ProductStore for Arc<S>
where
    S: ProductStore + ?Sized,
{
    async fn list_products(&self) -> Result<Vec<Product>, StoreError> {
        (**self).list_products().await
    }

    async fn get_product(&self, id: ProductId) -> Result<Product, StoreError> {
        (**self).get_product(id).await
    }
}
