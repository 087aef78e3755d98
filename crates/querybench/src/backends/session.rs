//! Session per iteration.
//!
//! Opens a unit of work, runs the structured query through it, materializes
//! every row, then closes the session. Compilation happens per call, as an
//! ORM session would do it.

use std::hint::black_box;

use async_trait::async_trait;

use super::{Backend, PoolSlot};
use crate::driver::{Connector, Pool, Session};
use crate::error::Error;
use crate::spec::QuerySpec;

pub struct SessionBackend<C: Connector> {
    label: String,
    pool: PoolSlot<C>,
    rows_fetched: u64,
}

impl<C: Connector> SessionBackend<C> {
    pub fn new(label: impl Into<String>, connector: C) -> Self {
        Self {
            label: label.into(),
            pool: PoolSlot::new(connector),
            rows_fetched: 0,
        }
    }

    /// Rows materialized since setup.
    pub fn rows_fetched(&self) -> u64 {
        self.rows_fetched
    }
}

#[async_trait]
impl<C: Connector> Backend for SessionBackend<C> {
    fn label(&self) -> &str {
        &self.label
    }

    async fn setup(&mut self) -> Result<(), Error> {
        self.rows_fetched = 0;
        self.pool.open().await
    }

    async fn execute(&mut self, spec: &QuerySpec) -> Result<(), Error> {
        let compiled = spec.compile()?;
        let mut session = self.pool.get()?.session().await?;

        let rows = match session.fetch_all(&compiled.sql, &compiled.params).await {
            Ok(rows) => rows,
            Err(error) => {
                if let Err(close_error) = session.close().await {
                    tracing::debug!(backend = %self.label, error = %close_error, "session close after failure");
                }
                return Err(error);
            }
        };
        session.close().await?;

        self.rows_fetched += black_box(rows).len() as u64;
        Ok(())
    }

    async fn teardown(&mut self) -> Result<(), Error> {
        if self.pool.get().is_ok() {
            tracing::debug!(backend = %self.label, rows = self.rows_fetched, "session rows materialized");
        }
        self.pool.close().await
    }
}
