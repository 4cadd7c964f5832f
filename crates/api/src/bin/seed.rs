//! Load inventory and product JSON files into the Postgres tables.

use std::path::PathBuf;

use anyhow::{bail, Context};
use clap::Parser;

use warehouse_infra::config::{AppConfig, DEFAULT_CONFIG_PATH};
use warehouse_infra::{db, seed};

/// `warehouse-seed` command arguments.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "warehouse-seed",
    about = "Import articles and products from JSON into the warehouse database",
    version
)]
struct CliArgs {
    /// TOML config file supplying the `[database]` section.
    #[arg(long, value_name = "path", default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,
    /// Inventory file: `{"inventory": [{"art_id", "name", "stock"}]}`.
    #[arg(long, value_name = "path")]
    inventory: Option<PathBuf>,
    /// Products file: `{"products": [{"name", "price", "contain_articles"}]}`.
    #[arg(long, value_name = "path")]
    products: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = CliArgs::parse();
    if args.inventory.is_none() && args.products.is_none() {
        bail!("nothing to seed: pass --inventory and/or --products");
    }

    let config = AppConfig::load(&args.config)
        .with_context(|| format!("load config from {}", args.config.display()))?;
    warehouse_observability::init(&config.telemetry.log_level, config.telemetry.json);

    // Parse everything before touching the database.
    let inventory = args
        .inventory
        .as_deref()
        .map(seed::read_inventory)
        .transpose()?;
    let catalog = args
        .products
        .as_deref()
        .map(seed::read_products)
        .transpose()?;

    let pool = db::connect(&config.database)
        .await
        .context("connect to database")?;
    if config.database.migrations {
        db::migrate(&pool).await.context("apply migrations")?;
    }

    if let Some(articles) = inventory {
        let inserted = seed::insert_articles(&pool, &articles).await?;
        tracing::info!(inserted, "articles seeded");
    }
    if let Some(products) = catalog {
        let ids = seed::insert_products(&pool, &products).await?;
        tracing::info!(inserted = ids.len(), "products seeded");
    }

    pool.close().await;
    Ok(())
}
