//! PostgresProductStore - WriteStore implementation for the primary store

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use sqlx::{FromRow, PgPool};
use std::sync::Arc;

use duostore_core::{
    Error, NewProduct, Price, Product, RecordId, Result, creation_time,
    store::{ReadStore, WriteStore},
};

use crate::STORE_NAME;
use crate::config::PostgresStoreConfig;
use crate::migrations::run_migrations;

const SELECT_COLUMNS: &str =
    "id, product_name, category, (price * 100)::BIGINT AS price_cents, stock, create_time";

/// Row shape of the `products` table, price in minor units
#[derive(Debug, FromRow)]
struct ProductRow {
    id: i64,
    product_name: String,
    category: String,
    price_cents: i64,
    stock: i32,
    create_time: DateTime<Utc>,
}

impl From<ProductRow> for Product {
    fn from(row: ProductRow) -> Self {
        Product {
            id: row.id,
            product_name: row.product_name,
            category: row.category,
            price: Price::from_cents(row.price_cents),
            stock: row.stock,
            create_time: row.create_time,
        }
    }
}

/// Primary, write-capable product store
#[derive(Clone)]
pub struct PostgresProductStore {
    pool: Arc<PgPool>,
}

impl PostgresProductStore {
    /// Connect, then apply pending schema migrations
    ///
    /// # Errors
    /// - `Error::Config` if the URL cannot be parsed
    /// - `Error::Store` if the connection or a migration fails
    pub async fn connect(config: &PostgresStoreConfig) -> Result<Self> {
        let mut options: PgConnectOptions = config.url.parse().map_err(|e| {
            Error::Config(format!("Invalid PostgreSQL URL '{}': {}", config.url, e))
        })?;
        if let Some(username) = &config.username {
            options = options.username(username);
        }
        if let Some(password) = &config.password {
            options = options.password(password);
        }

        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .acquire_timeout(config.acquire_timeout)
            .idle_timeout(Some(config.idle_timeout))
            .max_lifetime(Some(config.max_lifetime))
            .connect_with(options)
            .await
            .map_err(|e| Error::store(STORE_NAME, "Failed to connect to PostgreSQL", e))?;

        run_migrations(&pool).await?;

        Ok(Self::from_pool(pool))
    }

    /// Wrap an existing pool; no migrations are run
    pub fn from_pool(pool: PgPool) -> Self {
        Self {
            pool: Arc::new(pool),
        }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Close the pool, waiting for checked-out connections to return
    pub async fn close(&self) {
        self.pool.close().await;
    }
}

#[async_trait]
impl ReadStore<Product> for PostgresProductStore {
    fn name(&self) -> &str {
        STORE_NAME
    }

    async fn find_by_id(&self, id: RecordId) -> Result<Option<Product>> {
        let row: Option<ProductRow> =
            sqlx::query_as(&format!("SELECT {} FROM products WHERE id = $1", SELECT_COLUMNS))
                .bind(id.get())
                .fetch_optional(&*self.pool)
                .await
                .map_err(|e| {
                    Error::store(STORE_NAME, format!("Failed to query product {}", id), e)
                })?;

        Ok(row.map(Product::from))
    }

    async fn find_all(&self) -> Result<Vec<Product>> {
        let rows: Vec<ProductRow> =
            sqlx::query_as(&format!("SELECT {} FROM products ORDER BY id", SELECT_COLUMNS))
                .fetch_all(&*self.pool)
                .await
                .map_err(|e| Error::store(STORE_NAME, "Failed to query products", e))?;

        Ok(rows.into_iter().map(Product::from).collect())
    }
}

#[async_trait]
impl WriteStore<Product, NewProduct> for PostgresProductStore {
    async fn insert(&self, draft: NewProduct) -> Result<Product> {
        // TIMESTAMPTZ keeps microseconds; the returned record must equal a later read
        let create_time = creation_time();

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| Error::store(STORE_NAME, "Failed to start transaction", e))?;

        let row: ProductRow = sqlx::query_as(&format!(
            r#"
            INSERT INTO products (product_name, category, price, stock, create_time)
            VALUES ($1, $2, $3::NUMERIC / 100, $4, $5)
            RETURNING {}
            "#,
            SELECT_COLUMNS
        ))
        .bind(&draft.product_name)
        .bind(&draft.category)
        .bind(draft.price.cents())
        .bind(draft.stock)
        .bind(create_time)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| Error::store(STORE_NAME, "Failed to insert product", e))?;

        // Dropping an uncommitted transaction rolls it back
        tx.commit()
            .await
            .map_err(|e| Error::store(STORE_NAME, "Failed to commit product insert", e))?;

        tracing::debug!("Inserted product {} into {}", row.id, STORE_NAME);
        Ok(row.into())
    }
}
