//! The query every backend issues.
//!
//! A [`QuerySpec`] carries the same query twice: as a structured [`Select`]
//! for backends that compile per call, and as pre-rendered SQL text with its
//! parameter for backends that skip compilation. Both select the same rows.

use querybench_sql::{CompileError, CompiledQuery, Compiler, Select, SqlType, Table, Value};

/// Schema filtered on by default.
pub const DEFAULT_SCHEMA: &str = "pg_catalog";

/// Pre-rendered text of the catalog query.
pub const PG_TABLES_SQL: &str = "SELECT * FROM pg_catalog.pg_tables WHERE schemaname = $1";

/// Column the catalog query filters on.
pub const FILTER_COLUMN: &str = "schemaname";

/// The `pg_catalog.pg_tables` view with the columns the harness reads.
pub fn pg_tables() -> Table {
    Table::new("pg_catalog", "pg_tables")
        .with_column("schemaname", SqlType::Text)
        .with_column("tablename", SqlType::Text)
        .with_column("tableowner", SqlType::Text)
        .with_column("tablespace", SqlType::Text)
        .with_column("hasindexes", SqlType::Bool)
}

/// Immutable description of the benchmarked query.
#[derive(Debug, Clone)]
pub struct QuerySpec {
    table: Table,
    filter_column: String,
    filter_value: Value,
    select: Select,
    sql: String,
    params: Vec<Value>,
}

impl QuerySpec {
    /// Catalog tables belonging to `schema`.
    pub fn pg_tables(schema: impl Into<String>) -> Self {
        let schema = schema.into();
        let table = pg_tables();
        let select = table
            .select()
            .filter(table.column(FILTER_COLUMN).eq(schema.as_str()));

        Self {
            filter_column: FILTER_COLUMN.to_string(),
            filter_value: Value::from(schema.as_str()),
            select,
            sql: PG_TABLES_SQL.to_string(),
            params: vec![Value::String(schema)],
            table,
        }
    }

    /// Name of the queried view.
    pub fn table_name(&self) -> &str {
        &self.table.name
    }

    /// The queried view definition.
    pub fn table(&self) -> &Table {
        &self.table
    }

    pub fn filter_column(&self) -> &str {
        &self.filter_column
    }

    pub fn filter_value(&self) -> &Value {
        &self.filter_value
    }

    /// Structured form for query-builder backends.
    pub fn select(&self) -> &Select {
        &self.select
    }

    /// Pre-rendered SQL text.
    pub fn sql(&self) -> &str {
        &self.sql
    }

    /// Positional parameters for [`sql`](Self::sql).
    pub fn params(&self) -> &[Value] {
        &self.params
    }

    /// Compile the structured form. Called once per iteration by compiling backends.
    pub fn compile(&self) -> Result<CompiledQuery, CompileError> {
        Compiler::compile(&self.select)
    }
}

impl Default for QuerySpec {
    fn default() -> Self {
        Self::pg_tables(DEFAULT_SCHEMA)
    }
}
