//! SQLite-backed secondary store for duostore
//!
//! Implements `ReadStore<UserRecord>` over a read-only sqlx `SqlitePool`.
//! Rows are mapped by hand from named columns.
//!
//! # Example
//! ```no_run
//! # use duostore_store_sqlite::{SqliteStoreConfig, SqliteUserStore};
//! # async fn example() -> duostore_core::Result<()> {
//! let store = SqliteUserStore::connect(&SqliteStoreConfig::new("sqlite://users.db")).await?;
//! # Ok(())
//! # }
//! ```

mod sqlite_user_store;

pub use sqlite_user_store::{SqliteStoreConfig, SqliteUserStore};

/// Name reported by this store in logs, metrics and errors
pub const STORE_NAME: &str = "sqlite";
