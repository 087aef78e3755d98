//! Client-library seam.
//!
//! Backends talk to the database only through these traits so the same
//! strategy code runs against `sqlx` in production and against counting test
//! doubles in unit tests.

pub mod postgres;

#[cfg(test)]
pub(crate) mod mock;

use async_trait::async_trait;
use querybench_sql::Value;

use crate::error::Error;

pub use postgres::{PgConnector, PgPooledConnection, PgSession};

/// A materialized `pg_catalog.pg_tables` row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PgTableRow {
    pub schemaname: String,
    pub tablename: String,
    pub tableowner: String,
    pub tablespace: Option<String>,
    pub hasindexes: bool,
}

/// Creates the pool a backend reuses across iterations.
#[async_trait]
pub trait Connector: Send + Sync {
    type Pool: Pool;

    /// Open a pool. Fails with [`Error::Connection`].
    async fn connect(&self) -> Result<Self::Pool, Error>;
}

/// A pool of database connections.
#[async_trait]
pub trait Pool: Send + Sync {
    type Connection: Connection;
    type Session: Session;

    /// Check out a connection.
    async fn acquire(&self) -> Result<Self::Connection, Error>;

    /// Execute on a connection the pool checks out and returns internally.
    async fn execute(&self, sql: &str, params: &[Value]) -> Result<u64, Error>;

    /// Open a unit of work on a pooled connection.
    async fn session(&self) -> Result<Self::Session, Error>;

    /// Close every connection.
    async fn close(&self) -> Result<(), Error>;
}

/// A connection checked out of a [`Pool`].
#[async_trait]
pub trait Connection: Send {
    /// Execute a statement, discarding rows. Returns the affected row count.
    async fn execute(&mut self, sql: &str, params: &[Value]) -> Result<u64, Error>;

    /// Return the connection to its pool.
    async fn release(self);
}

/// A unit of work scoped to one pooled connection.
#[async_trait]
pub trait Session: Send {
    /// Run a query and materialize every row.
    async fn fetch_all(&mut self, sql: &str, params: &[Value]) -> Result<Vec<PgTableRow>, Error>;

    /// End the unit of work and give the connection back.
    async fn close(self) -> Result<(), Error>;
}
