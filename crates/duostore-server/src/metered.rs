//! Store decorator that records metrics and logs every operation

use async_trait::async_trait;
use std::future::Future;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error};

use duostore_core::{ReadStore, RecordId, Result, WriteStore};
use duostore_observability::Metrics;

/// Wraps a store port, timing each call into `Metrics`
pub struct MeteredStore<S> {
    inner: S,
    metrics: Arc<Metrics>,
}

impl<S> MeteredStore<S> {
    pub fn new(inner: S, metrics: Arc<Metrics>) -> Self {
        Self { inner, metrics }
    }

    async fn observe<T, F>(&self, store: &str, operation: &str, call: F) -> Result<T>
    where
        F: Future<Output = Result<T>>,
    {
        let start = Instant::now();
        let result = call.await;
        let elapsed = start.elapsed();

        self.metrics
            .record_operation(store, operation, result.is_ok(), elapsed.as_secs_f64());

        match &result {
            Ok(_) => debug!("{}.{} completed in {:?}", store, operation, elapsed),
            Err(e) => error!("{}.{} failed after {:?}: {}", store, operation, elapsed, e),
        }

        result
    }
}

#[async_trait]
impl<R, S> ReadStore<R> for MeteredStore<S>
where
    R: Send + 'static,
    S: ReadStore<R>,
{
    fn name(&self) -> &str {
        self.inner.name()
    }

    async fn find_by_id(&self, id: RecordId) -> Result<Option<R>> {
        self.observe(self.inner.name(), "find_by_id", self.inner.find_by_id(id))
            .await
    }

    async fn find_all(&self) -> Result<Vec<R>> {
        self.observe(self.inner.name(), "find_all", self.inner.find_all())
            .await
    }
}

#[async_trait]
impl<R, D, S> WriteStore<R, D> for MeteredStore<S>
where
    R: Send + 'static,
    D: Send + 'static,
    S: WriteStore<R, D>,
{
    async fn insert(&self, draft: D) -> Result<R> {
        self.observe(self.inner.name(), "insert", self.inner.insert(draft))
            .await
    }
}
