//! Application facade
//!
//! The single entry point for request handlers. It validates input before any
//! store is touched and hides which store answers a given operation.

use serde::Serialize;
use std::sync::Arc;

use crate::{
    NewProduct, Product, RecordId, Result, UserRecord,
    registry::{Role, StoreRegistry},
};

/// Outcome of the diagnostic cross-store probe
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProbeReport {
    pub secondary_store: String,
    pub secondary_available: bool,
    pub secondary_users: usize,
    pub primary_store: String,
    pub products: usize,
}

#[derive(Clone)]
pub struct Facade {
    registry: Arc<StoreRegistry>,
}

impl Facade {
    pub fn new(registry: Arc<StoreRegistry>) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &StoreRegistry {
        &self.registry
    }

    /// All users of the secondary store, empty when it is not configured
    pub async fn list_secondary_users(&self) -> Result<Vec<UserRecord>> {
        let users = self.registry.secondary().find_all().await?;
        tracing::info!("Queried secondary users, total records: {}", users.len());
        Ok(users)
    }

    /// One user of the secondary store
    ///
    /// # Errors
    /// - `Error::InvalidArgument` if `id` is not positive (checked before any query)
    pub async fn find_secondary_user(&self, id: i64) -> Result<Option<UserRecord>> {
        let id = RecordId::new(id)?;
        let user = self.registry.secondary().find_by_id(id).await?;
        if user.is_none() {
            tracing::warn!("Secondary user not found by id: {}", id);
        }
        Ok(user)
    }

    pub async fn list_products(&self) -> Result<Vec<Product>> {
        let products = self.registry.primary().find_all().await?;
        tracing::info!("Queried products, total records: {}", products.len());
        Ok(products)
    }

    /// # Errors
    /// - `Error::InvalidArgument` if `id` is not positive (checked before any query)
    pub async fn find_product(&self, id: i64) -> Result<Option<Product>> {
        let id = RecordId::new(id)?;
        self.registry.primary().find_by_id(id).await
    }

    /// Validate and persist a product draft
    ///
    /// # Errors
    /// - `Error::InvalidArgument` for a blank product name; nothing is written
    /// - `Error::Store` if the insert fails, with the driver error as source
    pub async fn create_product(&self, draft: NewProduct) -> Result<Product> {
        draft.validate()?;

        let product = self.registry.primary().insert(draft).await?;
        tracing::info!(
            "Created product {} ({}) in {}",
            product.id,
            product.product_name,
            self.registry.primary().name()
        );
        Ok(product)
    }

    /// Exercise both stores one after the other
    ///
    /// The two reads are independent; no transaction spans them.
    pub async fn diagnostic_cross_store_probe(&self) -> Result<ProbeReport> {
        let secondary = self.registry.secondary();
        let users = secondary.find_all().await?;

        let primary = self.registry.primary();
        let products = primary.find_all().await?;

        let report = ProbeReport {
            secondary_store: secondary.name().to_string(),
            secondary_available: self.registry.status(Role::Secondary).is_active(),
            secondary_users: users.len(),
            primary_store: primary.name().to_string(),
            products: products.len(),
        };
        tracing::info!(
            "Cross-store probe: {} users in {}, {} products in {}",
            report.secondary_users,
            report.secondary_store,
            report.products,
            report.primary_store
        );
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;
    use crate::registry::{PrimaryStore, SecondaryStore};
    use crate::testing::{MemoryProductStore, StaticUserStore};
    use crate::Price;
    use crate::MAX_PRICE_CENTS;
    use chrono::Utc;

    fn users() -> Vec<UserRecord> {
        vec![
            UserRecord {
                id: 1,
                user_name: "alice".to_string(),
                age: 31,
            },
            UserRecord {
                id: 2,
                user_name: "bob".to_string(),
                age: 45,
            },
        ]
    }

    fn widget() -> NewProduct {
        NewProduct {
            product_name: "Widget".to_string(),
            category: "Tools".to_string(),
            price: Price::from_cents(999),
            stock: 5,
        }
    }

    fn facade_with(
        products: Arc<MemoryProductStore>,
        secondary: Option<SecondaryStore>,
    ) -> Facade {
        let primary: PrimaryStore = products;
        Facade::new(Arc::new(StoreRegistry::new(Some(primary), secondary).unwrap()))
    }

    #[tokio::test]
    async fn test_create_product_read_after_write() {
        let store = Arc::new(MemoryProductStore::default());
        let facade = facade_with(store.clone(), None);

        let before = Utc::now();
        let created = facade.create_product(widget()).await.unwrap();

        assert!(created.id > 0);
        assert_eq!(created.product_name, "Widget");
        assert_eq!(created.category, "Tools");
        assert_eq!(created.price.to_string(), "9.99");
        assert_eq!(created.stock, 5);
        assert!(created.create_time >= before);

        let fetched = facade.find_product(created.id).await.unwrap();
        assert_eq!(fetched, Some(created));
    }

    #[tokio::test]
    async fn test_create_product_rejects_blank_name() {
        let store = Arc::new(MemoryProductStore::default());
        let facade = facade_with(store.clone(), None);

        let draft = NewProduct {
            product_name: String::new(),
            ..widget()
        };
        let result = facade.create_product(draft).await;

        assert!(matches!(result, Err(Error::InvalidArgument(_))));
        assert_eq!(store.insert_calls(), 0);
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_create_time_never_precedes_call() {
        let facade = facade_with(Arc::new(MemoryProductStore::default()), None);

        for _ in 0..2000 {
            let before = Utc::now();
            let created = facade.create_product(widget()).await.unwrap();
            assert!(
                created.create_time >= before,
                "{} < {}",
                created.create_time,
                before
            );
        }
    }

    #[tokio::test]
    async fn test_create_product_rejects_oversized_price() {
        let store = Arc::new(MemoryProductStore::default());
        let facade = facade_with(store.clone(), None);

        let draft = NewProduct {
            price: Price::from_cents(MAX_PRICE_CENTS + 1),
            ..widget()
        };
        let result = facade.create_product(draft).await;

        assert!(matches!(result, Err(Error::InvalidArgument(_))));
        assert_eq!(store.insert_calls(), 0);
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_create_product_wraps_store_failure() {
        let store = Arc::new(MemoryProductStore::failing("connection refused"));
        let facade = facade_with(store, None);

        let err = facade.create_product(widget()).await.unwrap_err();
        assert_eq!(err.store_name(), Some("memory"));
        assert!(std::error::Error::source(&err).is_some());
    }

    #[tokio::test]
    async fn test_non_positive_ids_rejected() {
        let store = Arc::new(MemoryProductStore::default());
        let facade = facade_with(store.clone(), None);

        assert!(matches!(
            facade.find_secondary_user(0).await,
            Err(Error::InvalidArgument(_))
        ));
        assert!(matches!(
            facade.find_product(-3).await,
            Err(Error::InvalidArgument(_))
        ));
        assert_eq!(store.lookup_calls(), 0);

        facade.find_product(3).await.unwrap();
        assert_eq!(store.lookup_calls(), 1);
    }

    #[tokio::test]
    async fn test_unknown_user_is_none() {
        let secondary: SecondaryStore = Arc::new(StaticUserStore::new(users()));
        let facade = facade_with(Arc::new(MemoryProductStore::default()), Some(secondary));

        assert!(facade.find_secondary_user(99).await.unwrap().is_none());
        let alice = facade.find_secondary_user(1).await.unwrap().unwrap();
        assert_eq!(alice.user_name, "alice");
    }

    #[tokio::test]
    async fn test_secondary_absent_degrades_but_products_work() {
        let facade = facade_with(Arc::new(MemoryProductStore::default()), None);

        assert!(facade.list_secondary_users().await.unwrap().is_empty());
        assert!(facade.find_secondary_user(1).await.unwrap().is_none());
        assert!(facade.list_products().await.is_ok());
    }

    #[tokio::test]
    async fn test_list_products_is_idempotent() {
        let facade = facade_with(Arc::new(MemoryProductStore::default()), None);
        facade.create_product(widget()).await.unwrap();

        let first = facade.list_products().await.unwrap();
        let second = facade.list_products().await.unwrap();
        assert_eq!(first, second);
        assert_eq!(first.len(), 1);
    }

    #[tokio::test]
    async fn test_list_products_failure_is_returned() {
        let facade = facade_with(Arc::new(MemoryProductStore::failing("timeout")), None);
        assert!(matches!(
            facade.list_products().await,
            Err(Error::Store { .. })
        ));
    }

    #[tokio::test]
    async fn test_probe_reports_both_stores() {
        let secondary: SecondaryStore = Arc::new(StaticUserStore::new(users()));
        let facade = facade_with(Arc::new(MemoryProductStore::default()), Some(secondary));
        facade.create_product(widget()).await.unwrap();

        let report = facade.diagnostic_cross_store_probe().await.unwrap();
        assert!(report.secondary_available);
        assert_eq!(report.secondary_users, 2);
        assert_eq!(report.products, 1);
        assert_eq!(report.primary_store, "memory");
    }

    #[tokio::test]
    async fn test_probe_without_secondary() {
        let facade = facade_with(Arc::new(MemoryProductStore::default()), None);

        let report = facade.diagnostic_cross_store_probe().await.unwrap();
        assert!(!report.secondary_available);
        assert_eq!(report.secondary_users, 0);
        assert_eq!(report.secondary_store, "secondary");
    }
}
