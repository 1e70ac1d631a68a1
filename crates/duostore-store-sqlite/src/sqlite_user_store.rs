//! SqliteUserStore - read-only ReadStore implementation for the secondary store

use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions, SqliteRow};
use sqlx::{Row, SqlitePool};
use std::sync::Arc;
use std::time::Duration;

use duostore_core::{Error, RecordId, Result, UserRecord, store::ReadStore};

use crate::STORE_NAME;

const SELECT_BY_ID: &str = "SELECT id, user_name, age FROM users WHERE id = ?";
const SELECT_ALL: &str = "SELECT id, user_name, age FROM users ORDER BY id";

/// Connection settings for the secondary store
#[derive(Debug, Clone)]
pub struct SqliteStoreConfig {
    /// `sqlite://` URL or bare file path
    pub url: String,
    pub max_connections: u32,
    pub acquire_timeout: Duration,
}

impl SqliteStoreConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            max_connections: 5,
            acquire_timeout: Duration::from_secs(5),
        }
    }

    pub fn with_max_connections(mut self, max_connections: u32) -> Self {
        self.max_connections = max_connections;
        self
    }

    pub fn with_acquire_timeout(mut self, timeout: Duration) -> Self {
        self.acquire_timeout = timeout;
        self
    }
}

/// Secondary user store, opened read-only
///
/// The table is owned outside this process; the store never migrates or
/// writes it.
#[derive(Clone)]
pub struct SqliteUserStore {
    pool: Arc<SqlitePool>,
}

impl SqliteUserStore {
    /// Open the database in read-only mode
    ///
    /// # Errors
    /// - `Error::Config` if the URL cannot be parsed
    /// - `Error::Store` if the database file cannot be opened
    pub async fn connect(config: &SqliteStoreConfig) -> Result<Self> {
        let options: SqliteConnectOptions = config
            .url
            .parse()
            .map_err(|e| Error::Config(format!("Invalid SQLite URL '{}': {}", config.url, e)))?;
        let options = options.read_only(true).create_if_missing(false);

        let pool = SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(config.acquire_timeout)
            .connect_with(options)
            .await
            .map_err(|e| Error::store(STORE_NAME, "Failed to open SQLite database", e))?;

        Ok(Self::from_pool(pool))
    }

    /// Wrap an existing pool (useful for testing)
    pub fn from_pool(pool: SqlitePool) -> Self {
        Self {
            pool: Arc::new(pool),
        }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }
}

fn map_user(row: &SqliteRow) -> std::result::Result<UserRecord, sqlx::Error> {
    Ok(UserRecord {
        id: row.try_get("id")?,
        user_name: row.try_get("user_name")?,
        age: row.try_get("age")?,
    })
}

#[async_trait]
impl ReadStore<UserRecord> for SqliteUserStore {
    fn name(&self) -> &str {
        STORE_NAME
    }

    async fn find_by_id(&self, id: RecordId) -> Result<Option<UserRecord>> {
        let row = sqlx::query(SELECT_BY_ID)
            .bind(id.get())
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| Error::store(STORE_NAME, format!("Failed to query user {}", id), e))?;

        match row {
            Some(row) => {
                let user = map_user(&row)
                    .map_err(|e| Error::store(STORE_NAME, "Failed to map user row", e))?;
                Ok(Some(user))
            }
            None => {
                tracing::debug!("No user with id {} in {}", id, STORE_NAME);
                Ok(None)
            }
        }
    }

    async fn find_all(&self) -> Result<Vec<UserRecord>> {
        let rows = sqlx::query(SELECT_ALL)
            .fetch_all(&*self.pool)
            .await
            .map_err(|e| Error::store(STORE_NAME, "Failed to query users", e))?;

        rows.iter()
            .map(|row| {
                map_user(row).map_err(|e| Error::store(STORE_NAME, "Failed to map user row", e))
            })
            .collect()
    }
}
