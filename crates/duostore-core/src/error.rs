//! Error types for duostore

use thiserror::Error;

/// Boxed cause carried by store failures
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// A required store was never configured
    #[error("Store unavailable: {store}")]
    StoreUnavailable { store: String },

    /// Failure reported by a backing store, original cause kept as `source()`
    #[error("Store error ({store}): {message}")]
    Store {
        store: String,
        message: String,
        #[source]
        source: Option<BoxError>,
    },

    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Configuration validation failed: {0}")]
    ConfigValidation(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Wrap a driver error raised by the named store
    pub fn store(
        store: impl Into<String>,
        message: impl Into<String>,
        source: impl Into<BoxError>,
    ) -> Self {
        Self::Store {
            store: store.into(),
            message: message.into(),
            source: Some(source.into()),
        }
    }

    /// Name of the store that produced this error, if any
    pub fn store_name(&self) -> Option<&str> {
        match self {
            Self::Store { store, .. } | Self::StoreUnavailable { store } => Some(store),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
