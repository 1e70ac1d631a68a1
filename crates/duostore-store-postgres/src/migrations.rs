//! Versioned schema migrations for the product store
//!
//! Each migration is applied at most once; applied versions are tracked in
//! `schema_migrations`.

use duostore_core::{Error, Result};
use sqlx::PgPool;
use tracing::{debug, info};

use crate::STORE_NAME;

/// A single schema migration
#[derive(Debug, Clone)]
pub struct Migration {
    /// Unique version number (must be sequential)
    pub version: i32,
    pub description: &'static str,
    pub up_sql: &'static str,
}

/// All migrations in order
pub const MIGRATIONS: &[Migration] = &[
    Migration {
        version: 1,
        description: "Create products table",
        up_sql: r#"
            CREATE TABLE IF NOT EXISTS products (
                id BIGSERIAL PRIMARY KEY,
                product_name TEXT NOT NULL,
                category TEXT NOT NULL DEFAULT '',
                price NUMERIC(12, 2) NOT NULL DEFAULT 0,
                stock INTEGER NOT NULL DEFAULT 0,
                create_time TIMESTAMPTZ NOT NULL DEFAULT NOW()
            )
        "#,
    },
    Migration {
        version: 2,
        description: "Index products by category",
        up_sql: r#"
            CREATE INDEX IF NOT EXISTS idx_products_category
            ON products(category)
        "#,
    },
];

/// Apply every pending migration in version order
///
/// # Errors
/// - `Error::Store` if a migration or its bookkeeping fails
pub async fn run_migrations(pool: &PgPool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS schema_migrations (
            version INTEGER PRIMARY KEY,
            description TEXT NOT NULL,
            applied_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
        )
        "#,
    )
    .execute(pool)
    .await
    .map_err(|e| Error::store(STORE_NAME, "Failed to create schema_migrations table", e))?;

    let applied_versions: Vec<i32> = sqlx::query_scalar("SELECT version FROM schema_migrations")
        .fetch_all(pool)
        .await
        .map_err(|e| Error::store(STORE_NAME, "Failed to fetch applied migrations", e))?;

    debug!(
        "Found {} applied migrations: {:?}",
        applied_versions.len(),
        applied_versions
    );

    for migration in MIGRATIONS {
        if applied_versions.contains(&migration.version) {
            debug!(
                "Skipping migration {}: {} (already applied)",
                migration.version, migration.description
            );
            continue;
        }

        info!(
            "Applying migration {}: {}",
            migration.version, migration.description
        );

        let mut tx = pool
            .begin()
            .await
            .map_err(|e| Error::store(STORE_NAME, "Failed to start migration transaction", e))?;

        sqlx::query(migration.up_sql)
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                Error::store(
                    STORE_NAME,
                    format!("Failed to apply migration {}", migration.version),
                    e,
                )
            })?;

        sqlx::query(
            "INSERT INTO schema_migrations (version, description) VALUES ($1, $2)
                ON CONFLICT (version) DO NOTHING",
        )
        .bind(migration.version)
        .bind(migration.description)
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            Error::store(
                STORE_NAME,
                format!("Failed to record migration {}", migration.version),
                e,
            )
        })?;

        tx.commit().await.map_err(|e| {
            Error::store(
                STORE_NAME,
                format!("Failed to commit migration {}", migration.version),
                e,
            )
        })?;
    }

    Ok(())
}
