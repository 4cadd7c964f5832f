//! Postgres-backed article and product stores.
//!
//! ## Schema
//!
//! - `articles (id integer primary key, name text, stock integer)`
//! - `products (id serial primary key, name text, price bigint, articles jsonb)`
//!
//! A product's bill-of-materials is stored as a JSON array of
//! `{"id": <article id>, "quantity": <units per product>}` objects, in order.
//!
//! ## Error Mapping
//!
//! | SQLx Error | StoreError |
//! |------------|------------|
//! | `fetch_optional` returned no row | `NotFound` |
//! | Row column missing / JSON rejected by domain validation | `Decode` |
//! | Anything else (database, pool, IO) | `Storage` |
//!
//! ## Thread Safety
//!
//! Both stores are `Clone + Send + Sync` and share the SQLx connection pool.

use async_trait::async_trait;
use sqlx::types::Json;
use sqlx::{FromRow, PgPool, Row};
use tracing::{instrument, Span};

use warehouse_core::{ArticleId, ProductId};
use warehouse_inventory::{Article, ArticleDecrement};
use warehouse_products::{Product, ProductArticle};

use super::{ArticleStore, ProductStore, StoreError};

/// Article inventory in the `articles` table.
#[derive(Debug, Clone)]
pub struct PostgresArticleStore {
    pool: PgPool,
}

impl PostgresArticleStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ArticleStore for PostgresArticleStore {
    #[instrument(skip(self), fields(article_count = tracing::field::Empty), err)]
    async fn list_articles(&self) -> Result<Vec<Article>, StoreError> {
        let rows = sqlx::query(
            r#"
            SELECT id, name, stock
            FROM articles
            ORDER BY id
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("list_articles", e))?;

        let articles = rows
            .iter()
            .map(|row| ArticleRow::from_row(row).map(Article::from))
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| StoreError::Decode(format!("article row: {e}")))?;

        Span::current().record("article_count", articles.len());
        Ok(articles)
    }

    #[instrument(skip(self), fields(article_id = %id), err)]
    async fn get_article(&self, id: ArticleId) -> Result<Article, StoreError> {
        let row = sqlx::query(
            r#"
            SELECT id, name, stock
            FROM articles
            WHERE id = $1
            "#,
        )
        .bind(id.get())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("get_article", e))?
        .ok_or(StoreError::NotFound {
            entity: "article",
            id: id.get(),
        })?;

        let article = ArticleRow::from_row(&row)
            .map_err(|e| StoreError::Decode(format!("article row: {e}")))?;
        Ok(article.into())
    }

    /// Set-based decrement: the batch is unnested, summed per id, and joined
    /// against `articles` in a single `UPDATE`, so the whole batch commits or
    /// none of it does and concurrent sellers cannot lose updates.
    #[instrument(skip(self, batch), fields(lines = batch.len()), err)]
    async fn decrement_stock(&self, batch: &[ArticleDecrement]) -> Result<u64, StoreError> {
        if batch.is_empty() {
            return Ok(0);
        }

        let (ids, quantities): (Vec<i32>, Vec<i32>) =
            batch.iter().map(|line| (line.id.get(), line.quantity)).unzip();

        let result = sqlx::query(
            r#"
            WITH to_remove (id, quantity) AS (
                SELECT id, SUM(quantity)::int
                FROM unnest($1::int[], $2::int[]) AS batch (id, quantity)
                GROUP BY id
            )
            UPDATE articles
            SET stock = articles.stock - to_remove.quantity
            FROM to_remove
            WHERE articles.id = to_remove.id
            "#,
        )
        .bind(ids)
        .bind(quantities)
        .execute(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("decrement_stock", e))?;

        let updated = result.rows_affected();
        tracing::debug!(updated, "decremented article stock");
        Ok(updated)
    }
}

/// Product catalog in the `products` table.
#[derive(Debug, Clone)]
pub struct PostgresProductStore {
    pool: PgPool,
}

impl PostgresProductStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ProductStore for PostgresProductStore {
    #[instrument(skip(self), err)]
    async fn list_products(&self) -> Result<Vec<Product>, StoreError> {
        let rows = sqlx::query(
            r#"
            SELECT id, name, price, articles
            FROM products
            ORDER BY id
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("list_products", e))?;

        rows.iter()
            .map(|row| ProductRow::from_row(row).map(Product::from))
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| StoreError::Decode(format!("product row: {e}")))
    }

    #[instrument(skip(self), fields(product_id = %id), err)]
    async fn get_product(&self, id: ProductId) -> Result<Product, StoreError> {
        let row = sqlx::query(
            r#"
            SELECT id, name, price, articles
            FROM products
            WHERE id = $1
            "#,
        )
        .bind(id.get())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("get_product", e))?
        .ok_or(StoreError::NotFound {
            entity: "product",
            id: id.get(),
        })?;

        let product = ProductRow::from_row(&row)
            .map_err(|e| StoreError::Decode(format!("product row: {e}")))?;
        Ok(product.into())
    }
}

/// Map SQLx errors to StoreError.
pub(crate) fn map_sqlx_error(operation: &str, err: sqlx::Error) -> StoreError {
    match err {
        sqlx::Error::Database(db_err) => {
            let code = db_err.code().map(|c| c.into_owned()).unwrap_or_default();
            StoreError::Storage(format!(
                "database error in {operation} ({code}): {}",
                db_err.message()
            ))
        }
        sqlx::Error::PoolClosed => {
            StoreError::Storage(format!("connection pool closed in {operation}"))
        }
        sqlx::Error::ColumnDecode { .. } | sqlx::Error::Decode(_) => {
            StoreError::Decode(format!("{operation}: {err}"))
        }
        _ => StoreError::Storage(format!("sqlx error in {operation}: {err}")),
    }
}

// SQLx row types

#[derive(Debug)]
struct ArticleRow {
    id: i32,
    name: String,
    stock: i32,
}

impl<'r> sqlx::FromRow<'r, sqlx::postgres::PgRow> for ArticleRow {
    fn from_row(row: &'r sqlx::postgres::PgRow) -> Result<Self, sqlx::Error> {
        Ok(ArticleRow {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
            stock: row.try_get("stock")?,
        })
    }
}

impl From<ArticleRow> for Article {
    fn from(row: ArticleRow) -> Self {
        Article::new(ArticleId::new(row.id), row.name, row.stock)
    }
}

#[derive(Debug)]
struct ProductRow {
    id: i32,
    name: String,
    price: i64,
    articles: Json<Vec<ProductArticle>>,
}

impl<'r> sqlx::FromRow<'r, sqlx::postgres::PgRow> for ProductRow {
    fn from_row(row: &'r sqlx::postgres::PgRow) -> Result<Self, sqlx::Error> {
        Ok(ProductRow {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
            price: row.try_get("price")?,
            articles: row.try_get("articles")?,
        })
    }
}

impl From<ProductRow> for Product {
    fn from(row: ProductRow) -> Self {
        Product::new(ProductId::new(row.id), row.name, row.price, row.articles.0)
    }
}
