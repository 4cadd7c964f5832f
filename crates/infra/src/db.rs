//! Database wiring: connection pool + schema migrations.

use std::time::Duration;

use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use tracing::instrument;

use crate::config::DatabaseConfig;

/// Open a Postgres connection pool for the configured database.
#[instrument(skip(cfg), fields(host = %cfg.host, port = cfg.port, database = %cfg.database), err)]
pub async fn connect(cfg: &DatabaseConfig) -> Result<PgPool, sqlx::Error> {
    let pool = PgPoolOptions::new()
        .max_connections(cfg.max_connections)
        .acquire_timeout(Duration::from_secs(cfg.acquire_timeout_secs))
        .connect(&cfg.dsn())
        .await?;

    tracing::info!("database pool ready");
    Ok(pool)
}

/// Apply pending migrations from the workspace `migrations/` directory.
#[instrument(skip(pool), err)]
pub async fn migrate(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("../../migrations").run(pool).await?;
    tracing::info!("database migrations applied");
    Ok(())
}
