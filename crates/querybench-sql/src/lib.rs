//! Structured query building for querybench.
//!
//! This crate provides a small, PostgreSQL-only SELECT builder and the
//! compiler that renders it to SQL text with positional parameters.
//!
//! # Modules
//!
//! - [`value`] - Literal values and column types
//! - [`query`] - Tables, columns, filters and the `Select` builder
//! - [`compiler`] - Rendering a `Select` to SQL text plus parameters
//! - [`error`] - Compilation error types
//!
//! # Example
//!
//! ```
//! use querybench_sql::{Compiler, SqlType, Table, Value};
//!
//! let tables = Table::new("pg_catalog", "pg_tables")
//!     .with_column("schemaname", SqlType::Name)
//!     .with_column("tablename", SqlType::Name);
//! let select = tables
//!     .select()
//!     .filter(tables.column("schemaname").eq(Value::from("pg_catalog")));
//!
//! let compiled = Compiler::compile(&select).unwrap();
//! assert_eq!(compiled.params, vec![Value::from("pg_catalog")]);
//! ```

pub mod compiler;
pub mod error;
pub mod query;
pub mod value;

pub use compiler::{CompiledQuery, Compiler};
pub use error::CompileError;
pub use query::{Column, ColumnRef, Filter, OrderDirection, OrderSpec, Select, Table};
pub use value::{SqlType, Value};
