//! Seed data import from JSON files.
//!
//! Input formats (numbers are string-encoded, except `price`):
//!
//! ```json
//! {"inventory": [{"art_id": "1", "name": "leg", "stock": "12"}]}
//! {"products": [{"name": "Dining Chair", "price": 0,
//!                "contain_articles": [{"art_id": "1", "amount_of": "4"}]}]}
//! ```
//!
//! Parsing is pure; writing goes to Postgres (one transaction per file) or
//! straight into the in-memory stores.

use std::io::Read;
use std::path::Path;

use serde::Deserialize;
use sqlx::PgPool;
use sqlx::types::Json;
use thiserror::Error;
use tracing::instrument;

use warehouse_core::{ArticleId, DomainError, ProductId};
use warehouse_inventory::Article;
use warehouse_products::{Product, ProductArticle};

use crate::store::postgres::map_sqlx_error;
use crate::store::{InMemoryArticleStore, InMemoryProductStore, StoreError};

#[derive(Debug, Error)]
pub enum SeedError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed seed json: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid {field} {value:?}: expected an integer")]
    Number { field: &'static str, value: String },
    #[error(transparent)]
    Domain(#[from] DomainError),
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// A product as read from seed data; the database assigns its id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductSeed {
    pub name: String,
    pub price: i64,
    pub articles: Vec<ProductArticle>,
}

impl ProductSeed {
    pub fn into_product(self, id: ProductId) -> Product {
        Product::new(id, self.name, self.price, self.articles)
    }
}

#[derive(Deserialize)]
struct InventoryFile {
    inventory: Vec<InventoryEntry>,
}

#[derive(Deserialize)]
struct InventoryEntry {
    art_id: String,
    name: String,
    stock: String,
}

#[derive(Deserialize)]
struct ProductsFile {
    products: Vec<ProductEntry>,
}

#[derive(Deserialize)]
struct ProductEntry {
    name: String,
    #[serde(default)]
    price: i64,
    #[serde(default)]
    contain_articles: Vec<ContainedArticle>,
}

#[derive(Deserialize)]
struct ContainedArticle {
    art_id: String,
    amount_of: String,
}

fn number(field: &'static str, value: &str) -> Result<i32, SeedError> {
    value.trim().parse().map_err(|_| SeedError::Number {
        field,
        value: value.to_string(),
    })
}

/// Parse an inventory file into articles.
pub fn parse_inventory(reader: impl Read) -> Result<Vec<Article>, SeedError> {
    let file: InventoryFile = serde_json::from_reader(reader)?;
    file.inventory
        .into_iter()
        .map(|entry| -> Result<Article, SeedError> {
            Ok(Article::new(
                ArticleId::new(number("art_id", &entry.art_id)?),
                entry.name,
                number("stock", &entry.stock)?,
            ))
        })
        .collect()
}

/// Parse a products file, preserving file order.
pub fn parse_products(reader: impl Read) -> Result<Vec<ProductSeed>, SeedError> {
    let file: ProductsFile = serde_json::from_reader(reader)?;
    file.products
        .into_iter()
        .map(|entry| -> Result<ProductSeed, SeedError> {
            let articles = entry
                .contain_articles
                .iter()
                .map(|a| -> Result<ProductArticle, SeedError> {
                    let id = ArticleId::new(number("art_id", &a.art_id)?);
                    Ok(ProductArticle::new(id, number("amount_of", &a.amount_of)?)?)
                })
                .collect::<Result<Vec<_>, _>>()?;

            Ok(ProductSeed {
                name: entry.name,
                price: entry.price,
                articles,
            })
        })
        .collect()
}

fn open(path: &Path) -> Result<std::fs::File, SeedError> {
    std::fs::File::open(path).map_err(|source| SeedError::Io {
        path: path.display().to_string(),
        source,
    })
}

pub fn read_inventory(path: &Path) -> Result<Vec<Article>, SeedError> {
    parse_inventory(std::io::BufReader::new(open(path)?))
}

pub fn read_products(path: &Path) -> Result<Vec<ProductSeed>, SeedError> {
    parse_products(std::io::BufReader::new(open(path)?))
}

/// Insert articles in one statement.
#[instrument(skip(pool, articles), fields(count = articles.len()), err)]
pub async fn insert_articles(pool: &PgPool, articles: &[Article]) -> Result<u64, SeedError> {
    let ids: Vec<i32> = articles.iter().map(|a| a.id.get()).collect();
    let names: Vec<String> = articles.iter().map(|a| a.name.clone()).collect();
    let stocks: Vec<i32> = articles.iter().map(|a| a.stock).collect();

    let result = sqlx::query(
        r#"
        INSERT INTO articles (id, name, stock)
        SELECT * FROM unnest($1::int[], $2::text[], $3::int[])
        "#,
    )
    .bind(ids)
    .bind(names)
    .bind(stocks)
    .execute(pool)
    .await
    .map_err(|e| map_sqlx_error("insert_articles", e))?;

    Ok(result.rows_affected())
}

/// Insert products in one transaction, returning the assigned ids in input order.
#[instrument(skip(pool, products), fields(count = products.len()), err)]
pub async fn insert_products(
    pool: &PgPool,
    products: &[ProductSeed],
) -> Result<Vec<ProductId>, SeedError> {
    let mut tx = pool
        .begin()
        .await
        .map_err(|e| map_sqlx_error("begin_transaction", e))?;

    let mut ids = Vec::with_capacity(products.len());
    for product in products {
        let id: i32 = sqlx::query_scalar(
            r#"
            INSERT INTO products (name, price, articles)
            VALUES ($1, $2, $3)
            RETURNING id
            "#,
        )
        .bind(&product.name)
        .bind(product.price)
        .bind(Json(&product.articles))
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| map_sqlx_error("insert_product", e))?;
        ids.push(ProductId::new(id));
    }

    tx.commit()
        .await
        .map_err(|e| map_sqlx_error("commit_transaction", e))?;
    Ok(ids)
}

/// Load seed data into the in-memory stores; products get ids 1..=n in file order.
pub fn load_in_memory(
    articles: &InMemoryArticleStore,
    products: &InMemoryProductStore,
    inventory: Vec<Article>,
    catalog: Vec<ProductSeed>,
) -> Result<(), SeedError> {
    for article in inventory {
        articles.insert(article)?;
    }
    for (id, seed) in (1..).zip(catalog) {
        products.insert(seed.into_product(ProductId::new(id)))?;
    }
    Ok(())
}
