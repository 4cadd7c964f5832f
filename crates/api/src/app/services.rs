use std::sync::Arc;

use thiserror::Error;

use warehouse_core::ProductId;
use warehouse_infra::{
    config::{AppConfig, DatabaseConfig, SeedConfig, StorageBackend},
    db,
    seed::{self, SeedError},
    store::{InMemoryArticleStore, InMemoryProductStore, PostgresArticleStore, PostgresProductStore},
    StockEngine, StockError,
};
use warehouse_inventory::Article;
use warehouse_products::{Product, ProductWithStock};

// Engine over shared in-memory maps (dev/test)
type InMemoryEngine = StockEngine<Arc<InMemoryArticleStore>, Arc<InMemoryProductStore>>;

// Engine over the Postgres tables; both stores share one pool
type PersistentEngine = StockEngine<PostgresArticleStore, PostgresProductStore>;

#[derive(Debug, Error)]
pub enum ServicesError {
    #[error("failed to connect to database: {0}")]
    Connect(#[source] sqlx::Error),
    #[error("failed to apply migrations: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),
    #[error("failed to load seed data: {0}")]
    Seed(#[from] SeedError),
}

#[derive(Debug, Clone)]
pub enum AppServices {
    InMemory { engine: Arc<InMemoryEngine> },
    Persistent { engine: Arc<PersistentEngine> },
}

pub async fn build_services(cfg: &AppConfig) -> Result<AppServices, ServicesError> {
    match cfg.storage {
        StorageBackend::Memory => build_in_memory_services(&cfg.seed),
        StorageBackend::Postgres => build_persistent_services(&cfg.database).await,
    }
}

/// In-memory wiring, optionally preloaded from the configured seed files.
pub fn build_in_memory_services(seed_cfg: &SeedConfig) -> Result<AppServices, ServicesError> {
    let inventory = match &seed_cfg.inventory {
        Some(path) => seed::read_inventory(path)?,
        None => Vec::new(),
    };
    let catalog = match &seed_cfg.products {
        Some(path) => seed::read_products(path)?,
        None => Vec::new(),
    };

    let articles = Arc::new(InMemoryArticleStore::new());
    let products = Arc::new(InMemoryProductStore::new());
    tracing::info!(
        articles = inventory.len(),
        products = catalog.len(),
        "using in-memory stores"
    );
    seed::load_in_memory(&articles, &products, inventory, catalog)?;

    Ok(AppServices::InMemory {
        engine: Arc::new(StockEngine::new(articles, products)),
    })
}

pub async fn build_persistent_services(db_cfg: &DatabaseConfig) -> Result<AppServices, ServicesError> {
    let pool = db::connect(db_cfg).await.map_err(ServicesError::Connect)?;
    if db_cfg.migrations {
        db::migrate(&pool).await?;
    }

    let engine = StockEngine::new(
        PostgresArticleStore::new(pool.clone()),
        PostgresProductStore::new(pool),
    );
    Ok(AppServices::Persistent {
        engine: Arc::new(engine),
    })
}

impl AppServices {
    /// In-memory services over the given data; products keep their ids.
    pub fn in_memory(articles: Vec<Article>, products: Vec<Product>) -> Self {
        let engine = StockEngine::new(
            Arc::new(InMemoryArticleStore::with_articles(articles)),
            Arc::new(InMemoryProductStore::with_products(products)),
        );
        AppServices::InMemory {
            engine: Arc::new(engine),
        }
    }

    pub async fn products_with_stock(&self) -> Result<Vec<ProductWithStock>, StockError> {
        match self {
            AppServices::InMemory { engine } => engine.products_with_stock().await,
            AppServices::Persistent { engine } => engine.products_with_stock().await,
        }
    }

    pub async fn remove_product(&self, id: ProductId, quantity: i32) -> Result<(), StockError> {
        match self {
            AppServices::InMemory { engine } => engine.remove_product(id, quantity).await,
            AppServices::Persistent { engine } => engine.remove_product(id, quantity).await,
        }
    }
}
