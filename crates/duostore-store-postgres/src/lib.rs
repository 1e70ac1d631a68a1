//! PostgreSQL-backed primary store for duostore
//!
//! This crate implements `WriteStore<Product, NewProduct>` on top of a sqlx
//! `PgPool`. Rows are mapped through `sqlx::FromRow` derives.
//!
//! # Features
//! - Pool tuning (connection limits, timeouts, lifetimes)
//! - Credentials kept separate from the connection URL
//! - Transactional inserts with `RETURNING`
//! - Automatic, versioned schema migrations
//!
//! # Example
//! ```no_run
//! # use duostore_store_postgres::{PostgresProductStore, PostgresStoreConfig};
//! # async fn example() -> duostore_core::Result<()> {
//! let config = PostgresStoreConfig::new("postgres://localhost/duostore");
//! let store = PostgresProductStore::connect(&config).await?;
//! # Ok(())
//! # }
//! ```

mod config;
pub mod migrations;
mod postgres_product_store;

pub use config::PostgresStoreConfig;
pub use postgres_product_store::PostgresProductStore;

/// Name reported by this store in logs, metrics and errors
pub const STORE_NAME: &str = "postgres";
