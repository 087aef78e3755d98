//! Harness error types.

use std::time::Duration;

use thiserror::Error;

/// Errors raised by a backend during a benchmark run.
#[derive(Debug, Error)]
pub enum Error {
    /// Database unreachable or authentication failed while creating the pool.
    #[error("connection error: {0}")]
    Connection(String),

    /// A query failed inside the timed loop.
    #[error("execution error: {0}")]
    Execution(String),

    /// The structured query could not be compiled.
    #[error("compile error: {0}")]
    Compile(#[from] querybench_sql::CompileError),

    /// Releasing the pool failed.
    #[error("teardown error: {0}")]
    Teardown(String),

    /// The timed loop exceeded the per-backend limit.
    #[error("timed out after {0:?}")]
    Timeout(Duration),

    /// Invalid configuration.
    #[error("configuration error: {0}")]
    Config(String),
}
