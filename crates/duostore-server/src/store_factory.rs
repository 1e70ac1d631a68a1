//! Store factory
//!
//! Connects the configured datasources and assembles the `StoreRegistry`.
//! The primary store is mandatory and any failure aborts startup. The
//! secondary store degrades: a missing, malformed or unreachable block is
//! logged and the role becomes unavailable.

use std::sync::Arc;
use tracing::{info, warn};

use duostore_core::{
    Error, NewProduct, Product, ReadStore, Result, Role, StoreRegistry, UserRecord, WriteStore,
};
use duostore_observability::Metrics;
use duostore_store_postgres::PostgresProductStore;
use duostore_store_sqlite::SqliteUserStore;

use crate::config::{DataSourceConfig, DataSourcesConfig};
use crate::metered::MeteredStore;

/// Stores opened at startup, kept so their pools can be closed on shutdown
pub struct ConnectedStores {
    pub primary: PostgresProductStore,
    pub secondary: Option<SqliteUserStore>,
}

impl ConnectedStores {
    /// Open both datasources
    ///
    /// # Errors
    /// - Any error from [`connect_primary`]
    pub async fn connect(config: &DataSourcesConfig) -> Result<Self> {
        let primary = connect_primary(config.primary.as_ref()).await?;
        let secondary = connect_secondary(config.secondary.as_ref()).await;
        Ok(Self { primary, secondary })
    }

    /// Wrap the open stores with metrics and resolve the roles
    pub fn registry(&self, metrics: &Arc<Metrics>) -> Result<StoreRegistry> {
        build_registry(
            Some(self.primary.clone()),
            self.secondary.clone(),
            metrics,
        )
    }

    pub async fn close(&self) {
        self.primary.close().await;
        if let Some(secondary) = &self.secondary {
            secondary.close().await;
        }
        info!("Store connection pools closed");
    }
}

/// Connect the primary store
///
/// # Errors
/// - `Error::StoreUnavailable` if no primary block is configured
/// - `Error::ConfigValidation` / `Error::Config` for a malformed block
/// - `Error::Store` if the database cannot be reached or migrated
pub async fn connect_primary(config: Option<&DataSourceConfig>) -> Result<PostgresProductStore> {
    let Some(config) = config else {
        return Err(Error::StoreUnavailable {
            store: Role::Primary.to_string(),
        });
    };

    let pg_config = config.to_postgres_config()?;
    info!("Connecting primary store ({})", config.driver);
    let store = PostgresProductStore::connect(&pg_config).await?;
    info!("✓ Primary store connected");
    Ok(store)
}

/// Connect the secondary store, returning `None` when it cannot be used
pub async fn connect_secondary(config: Option<&DataSourceConfig>) -> Option<SqliteUserStore> {
    let Some(config) = config else {
        info!("No secondary datasource configured");
        return None;
    };

    let sqlite_config = match config.to_sqlite_config() {
        Ok(c) => c,
        Err(e) => {
            warn!("Secondary datasource ignored: {}", e);
            return None;
        }
    };

    match SqliteUserStore::connect(&sqlite_config).await {
        Ok(store) => {
            info!("✓ Secondary store connected (read-only)");
            Some(store)
        }
        Err(e) => {
            warn!("Secondary store unavailable: {}", e);
            None
        }
    }
}

/// Resolve roles to metered store ports and publish their availability
pub fn build_registry<P, S>(
    primary: Option<P>,
    secondary: Option<S>,
    metrics: &Arc<Metrics>,
) -> Result<StoreRegistry>
where
    P: WriteStore<Product, NewProduct> + 'static,
    S: ReadStore<UserRecord> + 'static,
{
    metrics.set_store_available(Role::Primary.as_str(), primary.is_some());
    metrics.set_store_available(Role::Secondary.as_str(), secondary.is_some());

    let primary = primary.map(|store| {
        let port: duostore_core::PrimaryStore = Arc::new(MeteredStore::new(store, metrics.clone()));
        port
    });
    let secondary = secondary.map(|store| {
        let port: duostore_core::SecondaryStore =
            Arc::new(MeteredStore::new(store, metrics.clone()));
        port
    });

    StoreRegistry::new(primary, secondary)
}
