//! Counting test doubles for the driver traits.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use querybench_sql::Value;

use super::{Connection, Connector, PgTableRow, Pool, Session};
use crate::error::Error;

/// Call counters shared between a mock connector and everything it creates.
#[derive(Debug, Default)]
pub struct MockStats {
    pub connects: AtomicU64,
    pub acquires: AtomicU64,
    pub releases: AtomicU64,
    pub executes: AtomicU64,
    pub sessions: AtomicU64,
    pub session_closes: AtomicU64,
    pub closes: AtomicU64,
    /// Connections currently out of the pool, and the most ever out at once.
    pub checked_out: AtomicU64,
    pub peak_checked_out: AtomicU64,
    pub last_sql: std::sync::Mutex<Option<String>>,
}

#[derive(Debug, Clone, Default)]
pub struct MockConnector {
    pub stats: Arc<MockStats>,
    pub latency: Duration,
    /// Time taken to hand a connection back to the pool.
    pub release_latency: Duration,
    pub fail_connect: bool,
    /// Fail the execution with this 1-based index.
    pub fail_on: Option<u64>,
    pub fail_close: bool,
}

impl MockConnector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    pub fn with_release_latency(mut self, latency: Duration) -> Self {
        self.release_latency = latency;
        self
    }

    pub fn failing_connect(mut self) -> Self {
        self.fail_connect = true;
        self
    }

    pub fn failing_on(mut self, execution: u64) -> Self {
        self.fail_on = Some(execution);
        self
    }

    pub fn failing_close(mut self) -> Self {
        self.fail_close = true;
        self
    }
}

#[async_trait]
impl Connector for MockConnector {
    type Pool = MockPool;

    async fn connect(&self) -> Result<MockPool, Error> {
        self.stats.connects.fetch_add(1, Ordering::SeqCst);
        if self.fail_connect {
            return Err(Error::Connection("connection refused".to_string()));
        }
        Ok(MockPool {
            config: self.clone(),
        })
    }
}

pub struct MockPool {
    config: MockConnector,
}

impl MockPool {
    fn check_out(&self) {
        let stats = &self.config.stats;
        let out = stats.checked_out.fetch_add(1, Ordering::SeqCst) + 1;
        stats.peak_checked_out.fetch_max(out, Ordering::SeqCst);
    }

    async fn check_in(&self) {
        if !self.config.release_latency.is_zero() {
            tokio::time::sleep(self.config.release_latency).await;
        }
        self.config.stats.checked_out.fetch_sub(1, Ordering::SeqCst);
    }

    async fn run(&self, sql: &str) -> Result<u64, Error> {
        let n = self.config.stats.executes.fetch_add(1, Ordering::SeqCst) + 1;
        if let Ok(mut last) = self.config.stats.last_sql.lock() {
            *last = Some(sql.to_string());
        }
        if !self.config.latency.is_zero() {
            tokio::time::sleep(self.config.latency).await;
        }
        if self.config.fail_on == Some(n) {
            return Err(Error::Execution(format!("execution {} dropped", n)));
        }
        Ok(1)
    }
}

#[async_trait]
impl Pool for MockPool {
    type Connection = MockConnection;
    type Session = MockSession;

    async fn acquire(&self) -> Result<MockConnection, Error> {
        self.config.stats.acquires.fetch_add(1, Ordering::SeqCst);
        self.check_out();
        Ok(MockConnection {
            pool: MockPool {
                config: self.config.clone(),
            },
        })
    }

    async fn execute(&self, sql: &str, _params: &[Value]) -> Result<u64, Error> {
        self.check_out();
        let result = self.run(sql).await;
        self.check_in().await;
        result
    }

    async fn session(&self) -> Result<MockSession, Error> {
        self.config.stats.sessions.fetch_add(1, Ordering::SeqCst);
        self.check_out();
        Ok(MockSession {
            pool: MockPool {
                config: self.config.clone(),
            },
        })
    }

    async fn close(&self) -> Result<(), Error> {
        self.config.stats.closes.fetch_add(1, Ordering::SeqCst);
        if self.config.fail_close {
            return Err(Error::Teardown("close failed".to_string()));
        }
        Ok(())
    }
}

pub struct MockConnection {
    pool: MockPool,
}

#[async_trait]
impl Connection for MockConnection {
    async fn execute(&mut self, sql: &str, _params: &[Value]) -> Result<u64, Error> {
        self.pool.run(sql).await
    }

    async fn release(self) {
        self.pool.check_in().await;
        self.pool.config.stats.releases.fetch_add(1, Ordering::SeqCst);
    }
}

pub struct MockSession {
    pool: MockPool,
}

#[async_trait]
impl Session for MockSession {
    async fn fetch_all(&mut self, sql: &str, params: &[Value]) -> Result<Vec<PgTableRow>, Error> {
        self.pool.run(sql).await?;
        let schema = params
            .first()
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        Ok(vec![
            PgTableRow {
                schemaname: schema.clone(),
                tablename: "pg_class".to_string(),
                tableowner: "postgres".to_string(),
                tablespace: None,
                hasindexes: true,
            },
            PgTableRow {
                schemaname: schema,
                tablename: "pg_attribute".to_string(),
                tableowner: "postgres".to_string(),
                tablespace: None,
                hasindexes: true,
            },
        ])
    }

    async fn close(self) -> Result<(), Error> {
        self.pool.check_in().await;
        self.pool.config.stats.session_closes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
