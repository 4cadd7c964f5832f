//! In-memory stores for tests/dev.
//!
//! Maps are `BTreeMap`s so listings come back ordered by id, like the
//! `ORDER BY id` queries of the Postgres stores.

use std::collections::BTreeMap;
use std::sync::RwLock;

use async_trait::async_trait;

use warehouse_core::{ArticleId, Entity, ProductId};
use warehouse_inventory::{Article, ArticleDecrement};
use warehouse_products::Product;

use super::{ArticleStore, ProductStore, StoreError};

fn poisoned() -> StoreError {
    StoreError::Storage("in-memory store lock poisoned".to_string())
}

/// In-memory article inventory.
#[derive(Debug, Default)]
pub struct InMemoryArticleStore {
    inner: RwLock<BTreeMap<ArticleId, Article>>,
}

impl InMemoryArticleStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_articles(articles: impl IntoIterator<Item = Article>) -> Self {
        let map = articles.into_iter().map(|article| (article.id(), article)).collect();
        Self {
            inner: RwLock::new(map),
        }
    }

    /// Insert or replace an article.
    pub fn insert(&self, article: Article) -> Result<(), StoreError> {
        let mut map = self.inner.write().map_err(|_| poisoned())?;
        map.insert(article.id(), article);
        Ok(())
    }
}

#[async_trait]
impl ArticleStore for InMemoryArticleStore {
    async fn list_articles(&self) -> Result<Vec<Article>, StoreError> {
        let map = self.inner.read().map_err(|_| poisoned())?;
        Ok(map.values().cloned().collect())
    }

    async fn get_article(&self, id: ArticleId) -> Result<Article, StoreError> {
        let map = self.inner.read().map_err(|_| poisoned())?;
        map.get(&id).cloned().ok_or(StoreError::NotFound {
            entity: "article",
            id: id.get(),
        })
    }

    async fn decrement_stock(&self, batch: &[ArticleDecrement]) -> Result<u64, StoreError> {
        // Whole batch under one write lock: concurrent callers never interleave.
        let mut map = self.inner.write().map_err(|_| poisoned())?;

        let mut totals: BTreeMap<ArticleId, i32> = BTreeMap::new();
        for line in batch {
            if !map.contains_key(&line.id) {
                continue;
            }
            let total = totals.entry(line.id).or_insert(0);
            *total = total.checked_add(line.quantity).ok_or_else(|| {
                StoreError::Storage(format!("decrement for article {} overflows", line.id))
            })?;
        }

        // Validate every line before mutating so a failure leaves stock untouched.
        let mut updates = Vec::with_capacity(totals.len());
        for (id, total) in &totals {
            let current = map.get(id).map(|a| a.stock).unwrap_or_default();
            let stock = current.checked_sub(*total).ok_or_else(|| {
                StoreError::Storage(format!("stock for article {id} out of range"))
            })?;
            updates.push((*id, stock));
        }

        for (id, stock) in updates {
            if let Some(article) = map.get_mut(&id) {
                article.stock = stock;
            }
        }

        Ok(totals.len() as u64)
    }
}

/// In-memory product catalog.
#[derive(Debug, Default)]
pub struct InMemoryProductStore {
    inner: RwLock<BTreeMap<ProductId, Product>>,
}

impl InMemoryProductStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_products(products: impl IntoIterator<Item = Product>) -> Self {
        let map = products.into_iter().map(|product| (product.id(), product)).collect();
        Self {
            inner: RwLock::new(map),
        }
    }

    /// Insert or replace a product.
    pub fn insert(&self, product: Product) -> Result<(), StoreError> {
        let mut map = self.inner.write().map_err(|_| poisoned())?;
        map.insert(product.id(), product);
        Ok(())
    }
}

#[async_trait]
impl ProductStore for InMemoryProductStore {
    async fn list_products(&self) -> Result<Vec<Product>, StoreError> {
        let map = self.inner.read().map_err(|_| poisoned())?;
        Ok(map.values().cloned().collect())
    }

    async fn get_product(&self, id: ProductId) -> Result<Product, StoreError> {
        let map = self.inner.read().map_err(|_| poisoned())?;
        map.get(&id).cloned().ok_or(StoreError::NotFound {
            entity: "product",
            id: id.get(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn article(id: i32, stock: i32) -> Article {
        Article::new(ArticleId::new(id), format!("article-{id}"), stock)
    }

    fn stocks(store: &InMemoryArticleStore) -> Vec<(i32, i32)> {
        let map = store.inner.read().unwrap();
        map.values().map(|a| (a.id.get(), a.stock)).collect()
    }

    #[tokio::test]
    async fn lists_articles_ordered_by_id() {
        let store = InMemoryArticleStore::with_articles([article(3, 1), article(1, 1), article(2, 1)]);
        let ids: Vec<i32> = store
            .list_articles()
            .await
            .unwrap()
            .iter()
            .map(|a| a.id.get())
            .collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn empty_store_lists_nothing() {
        assert!(InMemoryArticleStore::new().list_articles().await.unwrap().is_empty());
        assert!(InMemoryProductStore::new().list_products().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn get_missing_article_is_not_found() {
        let err = InMemoryArticleStore::new()
            .get_article(ArticleId::new(5))
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn get_missing_product_is_not_found() {
        let err = InMemoryProductStore::new()
            .get_product(ProductId::new(5))
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn insert_replaces_by_id() {
        let store = InMemoryArticleStore::with_articles([article(1, 10)]);
        store.insert(article(1, 3)).unwrap();
        store.insert(article(2, 4)).unwrap();
        assert_eq!(stocks(&store), vec![(1, 3), (2, 4)]);
    }

    #[test]
    fn insert_into_poisoned_store_fails() {
        let store = std::sync::Arc::new(InMemoryProductStore::new());
        let holder = store.clone();
        let _ = std::thread::spawn(move || {
            let _guard = holder.inner.write().unwrap();
            panic!("writer died holding the lock");
        })
        .join();

        let product = Product::new(ProductId::new(1), "chair", 0, vec![]);
        let err = store.insert(product).unwrap_err();
        assert!(matches!(err, StoreError::Storage(_)));
    }

    #[tokio::test]
    async fn decrement_ignores_unknown_ids_and_applies_known() {
        let store = InMemoryArticleStore::with_articles([article(1, 10), article(2, 10)]);
        let batch = [
            ArticleDecrement::new(ArticleId::new(1), 4),
            ArticleDecrement::new(ArticleId::new(99), 4),
            ArticleDecrement::new(ArticleId::new(2), 1),
        ];

        let updated = store.decrement_stock(&batch).await.unwrap();

        assert_eq!(updated, 2);
        assert_eq!(stocks(&store), vec![(1, 6), (2, 9)]);
    }

    #[tokio::test]
    async fn decrement_can_go_negative() {
        let store = InMemoryArticleStore::with_articles([article(1, 2)]);
        store
            .decrement_stock(&[ArticleDecrement::new(ArticleId::new(1), 5)])
            .await
            .unwrap();
        assert_eq!(stocks(&store), vec![(1, -3)]);
    }

    #[tokio::test]
    async fn duplicate_ids_in_a_batch_are_summed() {
        let store = InMemoryArticleStore::with_articles([article(1, 10)]);
        store
            .decrement_stock(&[
                ArticleDecrement::new(ArticleId::new(1), 2),
                ArticleDecrement::new(ArticleId::new(1), 3),
            ])
            .await
            .unwrap();
        assert_eq!(stocks(&store), vec![(1, 5)]);
    }

    #[tokio::test]
    async fn failed_batch_leaves_stock_untouched() {
        let store = InMemoryArticleStore::with_articles([article(1, 10), article(2, i32::MIN)]);
        let err = store
            .decrement_stock(&[
                ArticleDecrement::new(ArticleId::new(1), 1),
                ArticleDecrement::new(ArticleId::new(2), 1),
            ])
            .await
            .unwrap_err();

        assert!(matches!(err, StoreError::Storage(_)));
        assert_eq!(stocks(&store), vec![(1, 10), (2, i32::MIN)]);
    }
}
