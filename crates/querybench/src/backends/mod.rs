//! Backend adapters.
//!
//! Each adapter is one client strategy: how connections are checked out and
//! whether SQL is compiled from the structured query on every call. The
//! [`Runner`](crate::runner::Runner) only sees the [`Backend`] trait, so
//! strategies can be added without touching it.

pub mod pool_execute;
pub mod pooled;
pub mod session;

use std::time::{Duration, Instant};

use async_trait::async_trait;
use querybench_sql::{CompiledQuery, Value};

use crate::driver::{Connector, Pool};
use crate::error::Error;
use crate::spec::QuerySpec;

pub use pool_execute::PoolExecuteBackend;
pub use pooled::PooledBackend;
pub use session::SessionBackend;

/// A benchmarked client strategy.
#[async_trait]
pub trait Backend: Send {
    /// Unique label used in the report.
    fn label(&self) -> &str;

    /// Create whatever is reused across iterations.
    async fn setup(&mut self) -> Result<(), Error>;

    /// Run one iteration of the strategy.
    async fn execute(&mut self, spec: &QuerySpec) -> Result<(), Error>;

    /// Time `iterations` sequential executions.
    ///
    /// Only the loop is measured; setup and teardown happen outside it. The
    /// first failing iteration aborts the loop.
    async fn run(&mut self, spec: &QuerySpec, iterations: u64) -> Result<Duration, Error> {
        let start = Instant::now();
        for _ in 0..iterations {
            self.execute(spec).await?;
        }
        Ok(start.elapsed())
    }

    /// Release resources. Calling it again is a no-op.
    async fn teardown(&mut self) -> Result<(), Error>;
}

/// Where the SQL text for an iteration comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryMode {
    /// Pre-rendered SQL and parameters.
    Raw,
    /// Compile the structured query on every call.
    Compiled,
}

impl QueryMode {
    /// Produce the statement for one iteration.
    pub fn statement(self, spec: &QuerySpec) -> Result<Statement<'_>, Error> {
        match self {
            QueryMode::Raw => Ok(Statement::Prepared {
                sql: spec.sql(),
                params: spec.params(),
            }),
            QueryMode::Compiled => Ok(Statement::Compiled(spec.compile()?)),
        }
    }
}

/// SQL text plus parameters, borrowed or freshly compiled.
#[derive(Debug)]
pub enum Statement<'a> {
    Prepared { sql: &'a str, params: &'a [Value] },
    Compiled(CompiledQuery),
}

impl Statement<'_> {
    pub fn sql(&self) -> &str {
        match self {
            Statement::Prepared { sql, .. } => sql,
            Statement::Compiled(compiled) => &compiled.sql,
        }
    }

    pub fn params(&self) -> &[Value] {
        match self {
            Statement::Prepared { params, .. } => params,
            Statement::Compiled(compiled) => &compiled.params,
        }
    }
}

/// The pool a backend holds between setup and teardown.
pub(crate) struct PoolSlot<C: Connector> {
    connector: C,
    pool: Option<C::Pool>,
}

impl<C: Connector> PoolSlot<C> {
    pub(crate) fn new(connector: C) -> Self {
        Self {
            connector,
            pool: None,
        }
    }

    pub(crate) async fn open(&mut self) -> Result<(), Error> {
        if self.pool.is_none() {
            self.pool = Some(self.connector.connect().await?);
        }
        Ok(())
    }

    pub(crate) fn get(&self) -> Result<&C::Pool, Error> {
        self.pool
            .as_ref()
            .ok_or_else(|| Error::Execution("backend used before setup".to_string()))
    }

    pub(crate) async fn close(&mut self) -> Result<(), Error> {
        match self.pool.take() {
            Some(pool) => pool.close().await,
            None => Ok(()),
        }
    }
}

/// The strategies the harness knows how to build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, clap::ValueEnum)]
pub enum Strategy {
    /// Acquire per iteration, pre-rendered SQL.
    PooledRaw,
    /// Acquire per iteration, compile per iteration.
    PooledCompiled,
    /// Transaction-scoped session per iteration, rows materialized.
    Session,
    /// Pool-level execute, pre-rendered SQL.
    PoolRaw,
    /// Pool-level execute, compile per iteration.
    PoolCompiled,
}

impl Strategy {
    /// Every strategy, in default run order.
    pub const ALL: [Strategy; 5] = [
        Strategy::PooledRaw,
        Strategy::PooledCompiled,
        Strategy::Session,
        Strategy::PoolRaw,
        Strategy::PoolCompiled,
    ];

    /// Command-line name.
    pub fn name(self) -> &'static str {
        match self {
            Strategy::PooledRaw => "pooled-raw",
            Strategy::PooledCompiled => "pooled-compiled",
            Strategy::Session => "session",
            Strategy::PoolRaw => "pool-raw",
            Strategy::PoolCompiled => "pool-compiled",
        }
    }

    /// Report label.
    pub fn label(self) -> &'static str {
        match self {
            Strategy::PooledRaw => "sqlx raw",
            Strategy::PooledCompiled => "sqlx compiled",
            Strategy::Session => "sqlx session",
            Strategy::PoolRaw => "sqlx pool raw",
            Strategy::PoolCompiled => "sqlx pool compiled",
        }
    }

    /// Build the adapter for this strategy over `connector`.
    pub fn build<C>(self, connector: C) -> Box<dyn Backend>
    where
        C: Connector + 'static,
    {
        let label = self.label();
        match self {
            Strategy::PooledRaw => Box::new(PooledBackend::new(label, connector, QueryMode::Raw)),
            Strategy::PooledCompiled => {
                Box::new(PooledBackend::new(label, connector, QueryMode::Compiled))
            }
            Strategy::Session => Box::new(SessionBackend::new(label, connector)),
            Strategy::PoolRaw => {
                Box::new(PoolExecuteBackend::new(label, connector, QueryMode::Raw))
            }
            Strategy::PoolCompiled => {
                Box::new(PoolExecuteBackend::new(label, connector, QueryMode::Compiled))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;
    use crate::driver::mock::MockConnector;

    #[test]
    fn test_labels_are_unique() {
        let labels: HashSet<_> = Strategy::ALL.iter().map(|s| s.label()).collect();
        assert_eq!(labels.len(), Strategy::ALL.len());
    }

    #[test]
    fn test_names_match_value_enum() {
        use clap::ValueEnum;
        for strategy in Strategy::ALL {
            let value = strategy.to_possible_value().unwrap();
            assert_eq!(value.get_name(), strategy.name());
        }
    }

    #[test]
    fn test_build_uses_strategy_label() {
        for strategy in Strategy::ALL {
            let backend = strategy.build(MockConnector::new());
            assert_eq!(backend.label(), strategy.label());
        }
    }

    #[test]
    fn test_raw_statement_borrows_spec() {
        let spec = QuerySpec::default();
        let statement = QueryMode::Raw.statement(&spec).unwrap();
        assert!(matches!(statement, Statement::Prepared { .. }));
        assert_eq!(statement.sql(), spec.sql());
        assert_eq!(statement.params(), spec.params());
    }

    #[test]
    fn test_compiled_statement_matches_params() {
        let spec = QuerySpec::default();
        let statement = QueryMode::Compiled.statement(&spec).unwrap();
        assert!(matches!(statement, Statement::Compiled(_)));
        assert_ne!(statement.sql(), spec.sql());
        assert_eq!(statement.params(), spec.params());
    }

    #[tokio::test]
    async fn test_execute_before_setup_fails() {
        let spec = QuerySpec::default();
        let mut backend = Strategy::PooledRaw.build(MockConnector::new());
        let err = backend.execute(&spec).await.unwrap_err();
        assert!(matches!(err, Error::Execution(_)));
    }
}
