//! Compilation error types.

use thiserror::Error;

/// Errors raised while rendering a [`Select`](crate::Select) to SQL.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CompileError {
    /// The select list is empty.
    #[error("select on {table} has no columns")]
    EmptyColumns { table: String },

    /// A filter or ordering references a column the table does not define.
    #[error("unknown column {column} on {table}")]
    UnknownColumn { table: String, column: String },

    /// An `AND` / `OR` group has no members.
    #[error("empty {0} group in filter")]
    EmptyGroup(&'static str),
}
