//! Application state shared by the request handlers

use std::sync::Arc;

use duostore_core::{Facade, Role, StoreRegistry, StoreStatus};
use duostore_observability::{ReadinessChecker, StoreReadiness};

/// Handler state: the facade over the registry resolved at startup
#[derive(Clone)]
pub struct AppState {
    pub facade: Arc<Facade>,
}

impl AppState {
    pub fn new(facade: Arc<Facade>) -> Self {
        Self { facade }
    }
}

/// Readiness derived from the registry: the primary role is required, the
/// secondary is reported but optional
pub struct RegistryReadiness {
    facade: Arc<Facade>,
}

impl RegistryReadiness {
    pub fn new(facade: Arc<Facade>) -> Self {
        Self { facade }
    }

    fn registry(&self) -> &StoreRegistry {
        self.facade.registry()
    }
}

impl ReadinessChecker for RegistryReadiness {
    fn store_statuses(&self) -> Vec<StoreReadiness> {
        self.registry()
            .statuses()
            .into_iter()
            .map(|(role, status)| {
                let available = status.is_active();
                let store = match status {
                    StoreStatus::Active { store } => Some(store),
                    StoreStatus::Unavailable => None,
                };
                StoreReadiness {
                    role: role.to_string(),
                    store,
                    required: role == Role::Primary,
                    available,
                }
            })
            .collect()
    }
}
