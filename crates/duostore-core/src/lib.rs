//! duostore core types and traits
//!
//! This crate provides everything that does not depend on a database driver:
//! - Record types for both stores
//! - The `ReadStore` / `WriteStore` port traits
//! - The startup-time `StoreRegistry`
//! - The `Facade` used by request handlers
//! - Core error types

pub mod error;
pub mod facade;
pub mod record;
pub mod registry;
pub mod store;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use error::{BoxError, Error, Result};
pub use facade::{Facade, ProbeReport};
pub use record::{
    MAX_PRICE_CENTS, NewProduct, Price, Product, RecordId, UserRecord, creation_time,
};
pub use registry::{PrimaryStore, Role, SecondaryStore, StoreRegistry, StoreStatus};
pub use store::{ReadStore, UnavailableStore, WriteStore};
