//! Routing registry
//!
//! Resolves the logical roles to store ports once, at startup. The primary
//! store is mandatory; a missing secondary store is replaced by an
//! [`UnavailableStore`] so callers never branch on its presence.

use serde::Serialize;
use std::fmt;
use std::sync::Arc;

use crate::{
    Error, NewProduct, Product, Result, UserRecord,
    store::{ReadStore, UnavailableStore, WriteStore},
};

/// Port type serving the primary role
pub type PrimaryStore = Arc<dyn WriteStore<Product, NewProduct>>;

/// Port type serving the secondary role
pub type SecondaryStore = Arc<dyn ReadStore<UserRecord>>;

/// Logical store role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Mandatory write-capable store
    Primary,
    /// Optional read-only store
    Secondary,
}

impl Role {
    pub const ALL: [Role; 2] = [Role::Primary, Role::Secondary];

    pub fn as_str(self) -> &'static str {
        match self {
            Role::Primary => "primary",
            Role::Secondary => "secondary",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Availability of a role as decided at startup
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum StoreStatus {
    Active { store: String },
    Unavailable,
}

impl StoreStatus {
    pub fn is_active(&self) -> bool {
        matches!(self, StoreStatus::Active { .. })
    }
}

/// Startup-time mapping from role to store port
#[derive(Clone)]
pub struct StoreRegistry {
    primary: PrimaryStore,
    secondary: SecondaryStore,
    secondary_active: bool,
}

impl StoreRegistry {
    /// Build the registry from whichever stores initialized
    ///
    /// # Errors
    /// - `Error::StoreUnavailable` if the primary store is missing
    pub fn new(primary: Option<PrimaryStore>, secondary: Option<SecondaryStore>) -> Result<Self> {
        let primary = primary.ok_or_else(|| Error::StoreUnavailable {
            store: Role::Primary.to_string(),
        })?;

        let secondary_active = secondary.is_some();
        let secondary = secondary.unwrap_or_else(|| {
            tracing::warn!(
                "Secondary store not configured, user queries will return empty results"
            );
            let fallback: SecondaryStore = Arc::new(UnavailableStore::new(Role::Secondary.as_str()));
            fallback
        });

        tracing::info!(
            "Store registry ready (primary={}, secondary={})",
            primary.name(),
            if secondary_active {
                secondary.name()
            } else {
                "unavailable"
            }
        );

        Ok(Self {
            primary,
            secondary,
            secondary_active,
        })
    }

    pub fn primary(&self) -> &PrimaryStore {
        &self.primary
    }

    pub fn secondary(&self) -> &SecondaryStore {
        &self.secondary
    }

    pub fn status(&self, role: Role) -> StoreStatus {
        match role {
            Role::Primary => StoreStatus::Active {
                store: self.primary.name().to_string(),
            },
            Role::Secondary if self.secondary_active => StoreStatus::Active {
                store: self.secondary.name().to_string(),
            },
            Role::Secondary => StoreStatus::Unavailable,
        }
    }

    pub fn statuses(&self) -> Vec<(Role, StoreStatus)> {
        Role::ALL.iter().map(|&role| (role, self.status(role))).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::RecordId;
    use crate::testing::{MemoryProductStore, StaticUserStore};

    #[test]
    fn test_missing_primary_fails() {
        let secondary: SecondaryStore = Arc::new(StaticUserStore::default());
        let result = StoreRegistry::new(None, Some(secondary));

        match result {
            Err(Error::StoreUnavailable { store }) => assert_eq!(store, "primary"),
            _ => panic!("expected StoreUnavailable"),
        }
    }

    #[tokio::test]
    async fn test_missing_secondary_degrades() {
        let primary: PrimaryStore = Arc::new(MemoryProductStore::default());
        let registry = StoreRegistry::new(Some(primary), None).unwrap();

        assert!(registry.status(Role::Primary).is_active());
        assert_eq!(registry.status(Role::Secondary), StoreStatus::Unavailable);
        assert!(registry.secondary().find_all().await.unwrap().is_empty());
        assert!(
            registry
                .secondary()
                .find_by_id(RecordId::new(1).unwrap())
                .await
                .unwrap()
                .is_none()
        );
    }

    #[test]
    fn test_both_active() {
        let primary: PrimaryStore = Arc::new(MemoryProductStore::default());
        let secondary: SecondaryStore = Arc::new(StaticUserStore::default());
        let registry = StoreRegistry::new(Some(primary), Some(secondary)).unwrap();

        let statuses = registry.statuses();
        assert_eq!(statuses.len(), 2);
        assert!(statuses.iter().all(|(_, status)| status.is_active()));
    }

    #[test]
    fn test_status_serialization() {
        let json = serde_json::to_value(StoreStatus::Active {
            store: "postgres".to_string(),
        })
        .unwrap();
        assert_eq!(json["status"], "active");
        assert_eq!(json["store"], "postgres");

        let json = serde_json::to_value(StoreStatus::Unavailable).unwrap();
        assert_eq!(json["status"], "unavailable");
    }
}
