//! querybench - PostgreSQL client strategy benchmark harness.
//!
//! Issues the same catalog query a fixed number of times through several
//! client strategies and ranks them by total wall-clock time.
//!
//! # Strategies
//!
//! - **Pooled raw**: acquire a pooled connection per query, pre-rendered SQL
//! - **Pooled compiled**: as above, compiling the structured query every time
//! - **Session**: a transaction-scoped session per query, rows materialized
//! - **Pool raw / pool compiled**: pool-level execute with internal checkout
//!
//! # Quick Start
//!
//! ```ignore
//! use querybench::{BenchConfig, QuerySpec, Runner};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() {
//!     let config = BenchConfig::default().with_iterations(1_000);
//!     let spec = QuerySpec::pg_tables(&config.schema);
//!     let backends = config
//!         .strategies
//!         .iter()
//!         .map(|s| s.build(config.connector()))
//!         .collect();
//!
//!     let results = Runner::new(&spec, config.iterations).run_all(backends).await;
//!     for line in querybench::report::render_lines(&results) {
//!         println!("{}", line);
//!     }
//! }
//! ```

pub mod backends;
pub mod config;
pub mod driver;
pub mod error;
pub mod report;
pub mod results;
pub mod runner;
pub mod spec;

pub use backends::{Backend, QueryMode, Strategy};
pub use config::{Args, BenchConfig};
pub use error::Error;
pub use report::ReportFormat;
pub use results::{BackendFailure, BenchmarkResult, BenchmarkResults, Phase};
pub use runner::{BackendState, Runner};
pub use spec::QuerySpec;

/// Re-export the query builder.
pub use querybench_sql as sql;
