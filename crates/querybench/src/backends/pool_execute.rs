//! Pool-level execute with no visible checkout.
//!
//! The pool picks a connection, runs the statement and returns the
//! connection internally, so the adapter never acquires or releases.

use async_trait::async_trait;

use super::{Backend, PoolSlot, QueryMode};
use crate::driver::{Connector, Pool};
use crate::error::Error;
use crate::spec::QuerySpec;

pub struct PoolExecuteBackend<C: Connector> {
    label: String,
    mode: QueryMode,
    pool: PoolSlot<C>,
}

impl<C: Connector> PoolExecuteBackend<C> {
    pub fn new(label: impl Into<String>, connector: C, mode: QueryMode) -> Self {
        Self {
            label: label.into(),
            mode,
            pool: PoolSlot::new(connector),
        }
    }
}

#[async_trait]
impl<C: Connector> Backend for PoolExecuteBackend<C> {
    fn label(&self) -> &str {
        &self.label
    }

    async fn setup(&mut self) -> Result<(), Error> {
        self.pool.open().await
    }

    async fn execute(&mut self, spec: &QuerySpec) -> Result<(), Error> {
        let statement = self.mode.statement(spec)?;
        self.pool
            .get()?
            .execute(statement.sql(), statement.params())
            .await
            .map(|_| ())
    }

    async fn teardown(&mut self) -> Result<(), Error> {
        self.pool.close().await
    }
}
