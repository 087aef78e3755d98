//! Explicit checkout per iteration.
//!
//! Each iteration acquires a connection, executes, and releases it before the
//! next begins. In [`QueryMode::Compiled`] the structured query is compiled
//! inside the timed region on every iteration.

use async_trait::async_trait;

use super::{Backend, PoolSlot, QueryMode};
use crate::driver::{Connection, Connector, Pool};
use crate::error::Error;
use crate::spec::QuerySpec;

pub struct PooledBackend<C: Connector> {
    label: String,
    mode: QueryMode,
    pool: PoolSlot<C>,
}

impl<C: Connector> PooledBackend<C> {
    pub fn new(label: impl Into<String>, connector: C, mode: QueryMode) -> Self {
        Self {
            label: label.into(),
            mode,
            pool: PoolSlot::new(connector),
        }
    }
}

#[async_trait]
impl<C: Connector> Backend for PooledBackend<C> {
    fn label(&self) -> &str {
        &self.label
    }

    async fn setup(&mut self) -> Result<(), Error> {
        self.pool.open().await
    }

    async fn execute(&mut self, spec: &QuerySpec) -> Result<(), Error> {
        let statement = self.mode.statement(spec)?;
        let mut conn = self.pool.get()?.acquire().await?;
        let result = conn.execute(statement.sql(), statement.params()).await;
        conn.release().await;
        result.map(|_| ())
    }

    async fn teardown(&mut self) -> Result<(), Error> {
        self.pool.close().await
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::Ordering;
    use std::time::Duration;

    use super::*;
    use crate::driver::mock::MockConnector;

    #[tokio::test]
    async fn test_raw_executes_exactly_n_times() {
        let connector = MockConnector::new().with_latency(Duration::from_millis(10));
        let stats = connector.stats.clone();
        let spec = QuerySpec::default();

        let mut backend = PooledBackend::new("pooled-raw", connector, QueryMode::Raw);
        backend.setup().await.unwrap();
        let elapsed = backend.run(&spec, 3).await.unwrap();
        backend.teardown().await.unwrap();

        assert_eq!(stats.executes.load(Ordering::SeqCst), 3);
        assert_eq!(stats.acquires.load(Ordering::SeqCst), 3);
        assert_eq!(stats.releases.load(Ordering::SeqCst), 3);
        assert!(elapsed >= Duration::from_millis(30), "elapsed {:?}", elapsed);
        assert!(elapsed < Duration::from_secs(2), "elapsed {:?}", elapsed);
    }

    #[tokio::test]
    async fn test_release_completes_before_next_checkout() {
        let connector = MockConnector::new().with_release_latency(Duration::from_millis(5));
        let stats = connector.stats.clone();
        let spec = QuerySpec::default();

        let mut backend = PooledBackend::new("pooled-raw", connector, QueryMode::Raw);
        backend.setup().await.unwrap();
        backend.run(&spec, 5).await.unwrap();

        assert_eq!(stats.peak_checked_out.load(Ordering::SeqCst), 1);
        assert_eq!(stats.checked_out.load(Ordering::SeqCst), 0);
        assert_eq!(stats.releases.load(Ordering::SeqCst), 5);
    }

    #[tokio::test]
    async fn test_raw_sends_prerendered_sql() {
        let connector = MockConnector::new();
        let stats = connector.stats.clone();
        let spec = QuerySpec::default();

        let mut backend = PooledBackend::new("raw", connector, QueryMode::Raw);
        backend.setup().await.unwrap();
        backend.execute(&spec).await.unwrap();

        let last = stats.last_sql.lock().unwrap().clone();
        assert_eq!(last.as_deref(), Some(spec.sql()));
    }

    #[tokio::test]
    async fn test_compiled_sends_compiled_sql() {
        let connector = MockConnector::new();
        let stats = connector.stats.clone();
        let spec = QuerySpec::default();

        let mut backend = PooledBackend::new("compiled", connector, QueryMode::Compiled);
        backend.setup().await.unwrap();
        backend.run(&spec, 2).await.unwrap();

        let last = stats.last_sql.lock().unwrap().clone();
        assert_eq!(last, Some(spec.compile().unwrap().sql));
        assert_eq!(stats.executes.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_failure_aborts_remaining_iterations_and_releases() {
        let connector = MockConnector::new().failing_on(2);
        let stats = connector.stats.clone();
        let spec = QuerySpec::default();

        let mut backend = PooledBackend::new("flaky", connector, QueryMode::Raw);
        backend.setup().await.unwrap();
        let err = backend.run(&spec, 10).await.unwrap_err();

        assert!(matches!(err, Error::Execution(_)));
        assert_eq!(stats.executes.load(Ordering::SeqCst), 2);
        assert_eq!(stats.releases.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_teardown_is_idempotent() {
        let connector = MockConnector::new();
        let stats = connector.stats.clone();

        let mut backend = PooledBackend::new("raw", connector, QueryMode::Raw);
        backend.setup().await.unwrap();
        backend.teardown().await.unwrap();
        backend.teardown().await.unwrap();

        assert_eq!(stats.closes.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_setup_failure_is_connection_error() {
        let connector = MockConnector::new().failing_connect();
        let mut backend = PooledBackend::new("down", connector, QueryMode::Raw);

        let err = backend.setup().await.unwrap_err();
        assert!(matches!(err, Error::Connection(_)));
        // Nothing to release.
        backend.teardown().await.unwrap();
    }
}
