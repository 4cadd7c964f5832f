//! Configuration loading and representation.
//!
//! Sources, lowest to highest precedence:
//!
//! 1. built-in defaults (`AppConfig::default()`)
//! 2. a TOML file (missing file is not an error)
//! 3. `WAREHOUSE_`-prefixed environment variables, `__` separating sections
//!    (e.g. `WAREHOUSE_DATABASE__HOST=db`)

use std::path::{Path, PathBuf};

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const DEFAULT_CONFIG_PATH: &str = "config/config.local.toml";
const ENV_PREFIX: &str = "WAREHOUSE_";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load config: {0}")]
    Load(#[from] figment::Error),
}

/// Application configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub telemetry: TelemetryConfig,
    pub storage: StorageBackend,
    pub seed: SeedConfig,
}

impl AppConfig {
    /// Load from `path` (if it exists) merged with the environment.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        Ok(Self::figment(path.as_ref()).extract()?)
    }

    fn figment(path: &Path) -> Figment {
        Figment::from(Serialized::defaults(AppConfig::default()))
            .merge(Toml::file(path))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
    }
}

/// HTTP listener.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Per-request deadline; the in-flight operation is dropped when it elapses.
    pub request_timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            request_timeout_secs: 10,
        }
    }
}

impl ServerConfig {
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Postgres connection settings.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    pub database: String,
    pub schema: Option<String>,
    /// Disable TLS (`sslmode=disable`).
    pub insecure: bool,
    /// Apply migrations on startup.
    pub migrations: bool,
    pub max_connections: u32,
    pub acquire_timeout_secs: u64,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 5432,
            username: "postgres".to_string(),
            password: String::new(),
            database: "warehouse".to_string(),
            schema: None,
            insecure: false,
            migrations: false,
            max_connections: 10,
            acquire_timeout_secs: 5,
        }
    }
}

impl DatabaseConfig {
    /// Connection string, e.g. `postgresql://u:p@host:5432/db?sslmode=disable&search_path=s`.
    pub fn dsn(&self) -> String {
        let mut dsn = format!(
            "postgresql://{}:{}@{}:{}/{}",
            self.username, self.password, self.host, self.port, self.database
        );

        let mut params = Vec::new();
        if self.insecure {
            params.push("sslmode=disable".to_string());
        }
        if let Some(schema) = self.schema.as_deref().filter(|s| !s.is_empty()) {
            params.push(format!("search_path={schema}"));
        }
        if !params.is_empty() {
            dsn.push('?');
            dsn.push_str(&params.join("&"));
        }
        dsn
    }
}

// Hand-written so the password never reaches logs.
impl std::fmt::Debug for DatabaseConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DatabaseConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .field("database", &self.database)
            .field("schema", &self.schema)
            .field("insecure", &self.insecure)
            .field("migrations", &self.migrations)
            .field("max_connections", &self.max_connections)
            .field("acquire_timeout_secs", &self.acquire_timeout_secs)
            .finish()
    }
}

/// Logging settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TelemetryConfig {
    /// Default filter when `RUST_LOG` is unset.
    pub log_level: String,
    pub json: bool,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            json: true,
        }
    }
}

/// Which store implementation backs the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    #[default]
    Postgres,
    Memory,
}

/// JSON files preloaded into the in-memory stores at startup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct SeedConfig {
    pub inventory: Option<PathBuf>,
    pub products: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dsn_without_params() {
        let cfg = DatabaseConfig {
            username: "u".into(),
            password: "p".into(),
            host: "db".into(),
            port: 5433,
            database: "stock".into(),
            ..DatabaseConfig::default()
        };
        assert_eq!(cfg.dsn(), "postgresql://u:p@db:5433/stock");
    }

    #[test]
    fn dsn_joins_params() {
        let cfg = DatabaseConfig {
            insecure: true,
            schema: Some("warehouse".into()),
            ..DatabaseConfig::default()
        };
        assert!(cfg.dsn().ends_with("?sslmode=disable&search_path=warehouse"));
    }

    #[test]
    fn debug_redacts_password() {
        let cfg = DatabaseConfig {
            password: "hunter2".into(),
            ..DatabaseConfig::default()
        };
        assert!(!format!("{cfg:?}").contains("hunter2"));
    }

    #[test]
    fn file_and_env_override_defaults() {
        figment::Jail::expect_with(|jail| {
            jail.create_file(
                "warehouse.toml",
                r#"
                storage = "memory"

                [server]
                port = 9000

                [database]
                host = "db.internal"
                migrations = true
                "#,
            )?;
            jail.set_env("WAREHOUSE_SERVER__REQUEST_TIMEOUT_SECS", "3");
            jail.set_env("WAREHOUSE_DATABASE__HOST", "db.override");

            let cfg = AppConfig::load("warehouse.toml").map_err(|e| e.to_string())?;

            assert_eq!(cfg.storage, StorageBackend::Memory);
            assert_eq!(cfg.server.port, 9000);
            assert_eq!(cfg.server.request_timeout_secs, 3);
            assert_eq!(cfg.server.host, "0.0.0.0");
            assert_eq!(cfg.database.host, "db.override");
            assert!(cfg.database.migrations);
            assert_eq!(cfg.telemetry.log_level, "info");
            Ok(())
        });
    }

    #[test]
    fn missing_file_uses_defaults() {
        figment::Jail::expect_with(|_jail| {
            let cfg = AppConfig::load("nope.toml").map_err(|e| e.to_string())?;
            assert_eq!(cfg, AppConfig::default());
            Ok(())
        });
    }
}
