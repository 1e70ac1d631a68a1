//! Data access ports
//!
//! `ReadStore` and `WriteStore` are the capability sets the facade depends on.
//! Each backing technology implements only the capabilities it grants:
//!
//! - `SqliteUserStore`: `ReadStore<UserRecord>` (secondary, read-only)
//! - `PostgresProductStore`: `WriteStore<Product, NewProduct>` (primary)
//!
//! # Example
//! ```no_run
//! # use duostore_core::store::ReadStore;
//! # use duostore_core::{RecordId, UserRecord};
//! # async fn example(store: &dyn ReadStore<UserRecord>) -> duostore_core::Result<()> {
//! let id = RecordId::new(1)?;
//! if let Some(user) = store.find_by_id(id).await? {
//!     println!("{}", user.user_name);
//! }
//! # Ok(())
//! # }
//! ```

use async_trait::async_trait;

use crate::{RecordId, Result};

/// Read capability over one store
#[async_trait]
pub trait ReadStore<R>: Send + Sync {
    /// Store name used in logs, metrics and error envelopes
    fn name(&self) -> &str;

    /// Look up a single record
    ///
    /// Returns `Ok(None)` when no record has this id.
    ///
    /// # Errors
    /// - `Error::Store` for connectivity or query failures
    async fn find_by_id(&self, id: RecordId) -> Result<Option<R>>;

    /// Fetch every record, ordered by id
    ///
    /// # Errors
    /// - `Error::Store` for connectivity or query failures
    async fn find_all(&self) -> Result<Vec<R>>;
}

/// Read and insert capability over one store
#[async_trait]
pub trait WriteStore<R, D>: ReadStore<R> {
    /// Persist a draft and return the stored record with its assigned id
    ///
    /// The insert is atomic: on error nothing is persisted.
    ///
    /// # Errors
    /// - `Error::Store` for connectivity, constraint or transaction failures
    async fn insert(&self, draft: D) -> Result<R>;
}

/// Stand-in for a store whose configuration was absent
///
/// Every read answers as if the store were empty.
#[derive(Debug, Clone)]
pub struct UnavailableStore {
    name: String,
}

impl UnavailableStore {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

#[async_trait]
impl<R: Send + 'static> ReadStore<R> for UnavailableStore {
    fn name(&self) -> &str {
        &self.name
    }

    async fn find_by_id(&self, id: RecordId) -> Result<Option<R>> {
        tracing::debug!("{} store is not configured, lookup of id {} skipped", self.name, id);
        Ok(None)
    }

    async fn find_all(&self) -> Result<Vec<R>> {
        tracing::debug!("{} store is not configured, returning no records", self.name);
        Ok(Vec::new())
    }
}
