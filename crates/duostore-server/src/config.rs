//! Server configuration
//!
//! Loaded from a YAML (default) or TOML file, then overridden by environment
//! variables. Each datasource block is optional:
//!
//! ```yaml
//! host: 127.0.0.1
//! port: 8080
//! datasources:
//!   primary:
//!     driver: postgres
//!     url: postgres://localhost/duostore
//!     username: app
//!     password: secret
//!   secondary:
//!     driver: sqlite
//!     url: sqlite://users.db
//! logging:
//!   level: info
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use duostore_core::{Error, Result, Role};
use duostore_store_postgres::PostgresStoreConfig;
use duostore_store_sqlite::SqliteStoreConfig;

pub const POSTGRES_DRIVER: &str = "postgres";
pub const SQLITE_DRIVER: &str = "sqlite";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default)]
    pub datasources: DataSourcesConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DataSourcesConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub primary: Option<DataSourceConfig>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub secondary: Option<DataSourceConfig>,
}

impl DataSourcesConfig {
    pub fn get(&self, role: Role) -> Option<&DataSourceConfig> {
        match role {
            Role::Primary => self.primary.as_ref(),
            Role::Secondary => self.secondary.as_ref(),
        }
    }
}

/// Connection block for one store
///
/// `driver` stays a plain string so a bad value only invalidates its own
/// block, not the whole file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataSourceConfig {
    pub driver: String,

    #[serde(default)]
    pub url: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,

    #[serde(flatten)]
    pub pool: PoolConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PoolConfig {
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,

    #[serde(default = "default_min_connections")]
    pub min_connections: u32,

    #[serde(default = "default_acquire_timeout")]
    pub acquire_timeout_seconds: u64,

    #[serde(default = "default_idle_timeout")]
    pub idle_timeout_seconds: u64,

    #[serde(default = "default_max_lifetime")]
    pub max_lifetime_seconds: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default = "default_false")]
    pub log_sql_queries: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            datasources: DataSourcesConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            max_connections: default_max_connections(),
            min_connections: default_min_connections(),
            acquire_timeout_seconds: default_acquire_timeout(),
            idle_timeout_seconds: default_idle_timeout(),
            max_lifetime_seconds: default_max_lifetime(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            log_sql_queries: false,
        }
    }
}

impl DataSourceConfig {
    pub fn new(driver: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            driver: driver.into(),
            url: url.into(),
            username: None,
            password: None,
            pool: PoolConfig::default(),
        }
    }

    /// Check the block is usable for the given role
    ///
    /// # Errors
    /// - `Error::ConfigValidation` for an empty URL or a driver that does not
    ///   match the role's technology
    pub fn validate(&self, role: Role) -> Result<()> {
        let expected = expected_driver(role);
        if !self.driver.eq_ignore_ascii_case(expected) {
            return Err(Error::ConfigValidation(format!(
                "datasources.{}.driver must be '{}', got '{}'",
                role, expected, self.driver
            )));
        }
        if self.url.trim().is_empty() {
            return Err(Error::ConfigValidation(format!(
                "datasources.{}.url is required",
                role
            )));
        }
        if self.pool.max_connections == 0 {
            return Err(Error::ConfigValidation(format!(
                "datasources.{}.max_connections must be at least 1",
                role
            )));
        }
        if self.pool.min_connections > self.pool.max_connections {
            return Err(Error::ConfigValidation(format!(
                "datasources.{}.min_connections exceeds max_connections",
                role
            )));
        }
        Ok(())
    }

    /// Pool settings for the primary store
    pub fn to_postgres_config(&self) -> Result<PostgresStoreConfig> {
        self.validate(Role::Primary)?;

        let mut config = PostgresStoreConfig::new(self.url.trim())
            .with_max_connections(self.pool.max_connections)
            .with_min_connections(self.pool.min_connections)
            .with_acquire_timeout(Duration::from_secs(self.pool.acquire_timeout_seconds))
            .with_idle_timeout(Duration::from_secs(self.pool.idle_timeout_seconds))
            .with_max_lifetime(Duration::from_secs(self.pool.max_lifetime_seconds));
        config.username = self.username.clone();
        config.password = self.password.clone();
        Ok(config)
    }

    /// Pool settings for the secondary store
    ///
    /// SQLite has no credentials; any configured are ignored.
    pub fn to_sqlite_config(&self) -> Result<SqliteStoreConfig> {
        self.validate(Role::Secondary)?;

        if self.username.is_some() || self.password.is_some() {
            tracing::warn!("datasources.secondary credentials are ignored by the sqlite driver");
        }

        let url = self.url.trim();
        let url = match url.strip_prefix("sqlite://") {
            Some(path) => format!("sqlite://{}", shellexpand::tilde(path)),
            None => url.to_string(),
        };

        Ok(SqliteStoreConfig::new(url)
            .with_max_connections(self.pool.max_connections)
            .with_acquire_timeout(Duration::from_secs(self.pool.acquire_timeout_seconds)))
    }
}

/// Driver identifier each role is implemented with
pub fn expected_driver(role: Role) -> &'static str {
    match role {
        Role::Primary => POSTGRES_DRIVER,
        Role::Secondary => SQLITE_DRIVER,
    }
}

impl ServerConfig {
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let expanded = shellexpand::tilde(&path.as_ref().to_string_lossy()).to_string();
        let path = PathBuf::from(expanded);

        let contents = std::fs::read_to_string(&path)?;

        let config = if path.extension().and_then(|s| s.to_str()) == Some("toml") {
            toml::from_str(&contents)
                .map_err(|e| Error::Config(format!("TOML parse error: {}", e)))?
        } else {
            // Default to YAML
            serde_yaml::from_str(&contents)
                .map_err(|e| Error::Config(format!("YAML parse error: {}", e)))?
        };

        Ok(config)
    }

    /// Merge environment variables into config (env vars take precedence)
    pub fn merge_env(&mut self) {
        if let Ok(val) = std::env::var("DUOSTORE_HOST") {
            self.host = val;
        }

        if let Ok(val) = std::env::var("DUOSTORE_PORT") {
            match val.parse::<u16>() {
                Ok(port) => self.port = port,
                Err(_) => tracing::warn!("Invalid DUOSTORE_PORT '{}', keeping {}", val, self.port),
            }
        }

        if let Ok(val) = std::env::var("DUOSTORE_LOG_LEVEL") {
            self.logging.level = val;
        }

        // Datasource URLs create the block when it is missing
        if let Ok(url) = std::env::var("DUOSTORE_PRIMARY_URL") {
            self.datasources
                .primary
                .get_or_insert_with(|| DataSourceConfig::new(POSTGRES_DRIVER, ""))
                .url = url;
        }

        if let Some(primary) = self.datasources.primary.as_mut() {
            if let Ok(username) = std::env::var("DUOSTORE_PRIMARY_USERNAME") {
                primary.username = Some(username);
            }
            if let Ok(password) = std::env::var("DUOSTORE_PRIMARY_PASSWORD") {
                primary.password = Some(password);
            }
        }

        if let Ok(url) = std::env::var("DUOSTORE_SECONDARY_URL") {
            self.datasources
                .secondary
                .get_or_insert_with(|| DataSourceConfig::new(SQLITE_DRIVER, ""))
                .url = url;
        }
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_max_connections() -> u32 {
    10
}

fn default_min_connections() -> u32 {
    1
}

fn default_acquire_timeout() -> u64 {
    5
}

fn default_idle_timeout() -> u64 {
    600
}

fn default_max_lifetime() -> u64 {
    1800
}

fn default_false() -> bool {
    false
}
