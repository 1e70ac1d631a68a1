//! In-memory store fakes for tests
//!
//! Enabled for this crate's own tests and for dependents through the
//! `testing` feature.

use async_trait::async_trait;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::{
    Error, NewProduct, Product, RecordId, Result, UserRecord, creation_time,
    store::{ReadStore, WriteStore},
};

/// Read-only user store over a fixed list
#[derive(Debug, Default)]
pub struct StaticUserStore {
    users: Vec<UserRecord>,
}

impl StaticUserStore {
    pub fn new(users: Vec<UserRecord>) -> Self {
        Self { users }
    }
}

#[async_trait]
impl ReadStore<UserRecord> for StaticUserStore {
    fn name(&self) -> &str {
        "static-users"
    }

    async fn find_by_id(&self, id: RecordId) -> Result<Option<UserRecord>> {
        Ok(self.users.iter().find(|u| u.id == id.get()).cloned())
    }

    async fn find_all(&self) -> Result<Vec<UserRecord>> {
        Ok(self.users.clone())
    }
}

/// Product store backed by a vector, with an optional forced failure
#[derive(Debug, Default)]
pub struct MemoryProductStore {
    products: Mutex<Vec<Product>>,
    inserts: AtomicUsize,
    lookups: AtomicUsize,
    fail_with: Option<String>,
}

impl MemoryProductStore {
    /// A store whose every operation fails with the given message
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            fail_with: Some(message.into()),
            ..Default::default()
        }
    }

    /// Number of insert calls that reached this store
    pub fn insert_calls(&self) -> usize {
        self.inserts.load(Ordering::SeqCst)
    }

    /// Number of find_by_id calls that reached this store
    pub fn lookup_calls(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }

    pub fn len(&self) -> usize {
        self.products.lock().map(|p| p.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn check(&self) -> Result<()> {
        match &self.fail_with {
            Some(message) => Err(Error::store(
                "memory",
                message.clone(),
                std::io::Error::other(message.clone()),
            )),
            None => Ok(()),
        }
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Vec<Product>>> {
        self.products
            .lock()
            .map_err(|_| Error::Store {
                store: "memory".to_string(),
                message: "lock poisoned".to_string(),
                source: None,
            })
    }
}

#[async_trait]
impl ReadStore<Product> for MemoryProductStore {
    fn name(&self) -> &str {
        "memory"
    }

    async fn find_by_id(&self, id: RecordId) -> Result<Option<Product>> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        self.check()?;
        Ok(self.lock()?.iter().find(|p| p.id == id.get()).cloned())
    }

    async fn find_all(&self) -> Result<Vec<Product>> {
        self.check()?;
        Ok(self.lock()?.clone())
    }
}

#[async_trait]
impl WriteStore<Product, NewProduct> for MemoryProductStore {
    async fn insert(&self, draft: NewProduct) -> Result<Product> {
        self.inserts.fetch_add(1, Ordering::SeqCst);
        self.check()?;

        let mut products = self.lock()?;
        let product = Product {
            id: products.len() as i64 + 1,
            product_name: draft.product_name,
            category: draft.category,
            price: draft.price,
            stock: draft.stock,
            create_time: creation_time(),
        };
        products.push(product.clone());
        Ok(product)
    }
}
