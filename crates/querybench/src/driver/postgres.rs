//! `sqlx` implementation of the driver traits.

use std::time::Duration;

use async_trait::async_trait;
use querybench_sql::Value;
use sqlx::pool::PoolConnection;
use sqlx::postgres::{PgArguments, PgPoolOptions, PgRow};
use sqlx::query::Query;
use sqlx::{PgPool, Postgres, Row};

use super::{Connection, Connector, PgTableRow, Pool, Session};
use crate::error::Error;

/// Default maximum pool size.
pub const DEFAULT_MAX_CONNECTIONS: u32 = 10;

/// Default timeout for checking out a pooled connection, in seconds.
pub const DEFAULT_ACQUIRE_TIMEOUT_SECS: u64 = 30;

/// Opens `sqlx` Postgres pools.
#[derive(Debug, Clone)]
pub struct PgConnector {
    dsn: String,
    max_connections: u32,
    acquire_timeout: Duration,
}

impl PgConnector {
    /// Create a connector for the given connection string.
    pub fn new(dsn: impl Into<String>) -> Self {
        Self {
            dsn: dsn.into(),
            max_connections: DEFAULT_MAX_CONNECTIONS,
            acquire_timeout: Duration::from_secs(DEFAULT_ACQUIRE_TIMEOUT_SECS),
        }
    }

    /// Set the maximum pool size.
    pub fn with_max_connections(mut self, max: u32) -> Self {
        self.max_connections = max;
        self
    }

    /// Set the acquire timeout.
    pub fn with_acquire_timeout(mut self, timeout: Duration) -> Self {
        self.acquire_timeout = timeout;
        self
    }

    pub fn dsn(&self) -> &str {
        &self.dsn
    }
}

#[async_trait]
impl Connector for PgConnector {
    type Pool = PgPool;

    async fn connect(&self) -> Result<PgPool, Error> {
        PgPoolOptions::new()
            .max_connections(self.max_connections)
            .acquire_timeout(self.acquire_timeout)
            .connect(&self.dsn)
            .await
            .map_err(|e| Error::Connection(e.to_string()))
    }
}

#[async_trait]
impl Pool for PgPool {
    type Connection = PgPooledConnection;
    type Session = PgSession;

    async fn acquire(&self) -> Result<PgPooledConnection, Error> {
        sqlx::Pool::acquire(self)
            .await
            .map(PgPooledConnection)
            .map_err(execution_error)
    }

    async fn execute(&self, sql: &str, params: &[Value]) -> Result<u64, Error> {
        // `Executor for &PgPool` hands its connection back from a task spawned
        // on drop, so check out here and await the return instead.
        let mut conn = sqlx::Pool::acquire(self).await.map_err(execution_error)?;
        let done = bind_params(sql, params).execute(&mut *conn).await;
        conn.return_to_pool().await;

        done.map(|done| done.rows_affected()).map_err(execution_error)
    }

    async fn session(&self) -> Result<PgSession, Error> {
        let mut conn = sqlx::Pool::acquire(self).await.map_err(execution_error)?;
        if let Err(e) = sqlx::Executor::execute(&mut *conn, sqlx::raw_sql("BEGIN")).await {
            conn.close_on_drop();
            return Err(execution_error(e));
        }
        Ok(PgSession(conn))
    }

    async fn close(&self) -> Result<(), Error> {
        sqlx::Pool::close(self).await;
        Ok(())
    }
}

/// A connection checked out of a [`PgPool`].
pub struct PgPooledConnection(PoolConnection<Postgres>);

#[async_trait]
impl Connection for PgPooledConnection {
    async fn execute(&mut self, sql: &str, params: &[Value]) -> Result<u64, Error> {
        bind_params(sql, params)
            .execute(&mut *self.0)
            .await
            .map(|done| done.rows_affected())
            .map_err(execution_error)
    }

    async fn release(self) {
        // Dropping a `PoolConnection` returns it from a spawned task that
        // pings the server first; await that here so the connection is idle
        // again before the next checkout.
        let mut conn = self.0;
        conn.return_to_pool().await;
    }
}

/// A transaction on a pooled connection.
///
/// Opened with `BEGIN` on a checked-out connection so `close` can await the
/// connection's return to the pool.
pub struct PgSession(PoolConnection<Postgres>);

#[async_trait]
impl Session for PgSession {
    async fn fetch_all(&mut self, sql: &str, params: &[Value]) -> Result<Vec<PgTableRow>, Error> {
        let rows = bind_params(sql, params)
            .fetch_all(&mut *self.0)
            .await
            .map_err(execution_error)?;

        rows.iter().map(decode_pg_table_row).collect()
    }

    async fn close(self) -> Result<(), Error> {
        let mut conn = self.0;

        // Read-only work, nothing to commit.
        match sqlx::Executor::execute(&mut *conn, sqlx::raw_sql("ROLLBACK")).await {
            Ok(_) => {
                conn.return_to_pool().await;
                Ok(())
            }
            Err(e) => {
                // The transaction state is unknown; don't let it back into the pool.
                conn.close_on_drop();
                Err(execution_error(e))
            }
        }
    }
}

/// Bind harness values onto a `sqlx` query in order.
fn bind_params<'q>(sql: &'q str, params: &'q [Value]) -> Query<'q, Postgres, PgArguments> {
    let mut query = sqlx::query(sql);
    for param in params {
        query = match param {
            Value::Null => query.bind(None::<String>),
            Value::Bool(v) => query.bind(*v),
            Value::Int32(v) => query.bind(*v),
            Value::Int64(v) => query.bind(*v),
            Value::Float64(v) => query.bind(*v),
            Value::String(v) => query.bind(v.as_str()),
        };
    }
    query
}

fn decode_pg_table_row(row: &PgRow) -> Result<PgTableRow, Error> {
    Ok(PgTableRow {
        schemaname: row.try_get("schemaname").map_err(execution_error)?,
        tablename: row.try_get("tablename").map_err(execution_error)?,
        tableowner: row.try_get("tableowner").map_err(execution_error)?,
        tablespace: row.try_get("tablespace").map_err(execution_error)?,
        hasindexes: row.try_get("hasindexes").map_err(execution_error)?,
    })
}

fn execution_error(e: sqlx::Error) -> Error {
    Error::Execution(e.to_string())
}
