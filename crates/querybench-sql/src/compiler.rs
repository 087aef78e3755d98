//! Rendering a [`Select`] to PostgreSQL text.
//!
//! Every literal in the filter becomes a `$n` placeholder, numbered from 1 in
//! order of appearance, and its value is appended to the parameter list. When
//! the filtered column has a declared type the placeholder carries a cast
//! (`$1::TEXT`), matching what asyncpg-style dialects emit.

use serde::Serialize;

use crate::error::CompileError;
use crate::query::{Filter, OrderDirection, Select, Table};
use crate::value::Value;

/// Words that must be quoted when used as identifiers.
const RESERVED: &[&str] = &[
    "all", "and", "as", "asc", "by", "case", "desc", "else", "end", "false", "from", "group",
    "in", "is", "limit", "not", "null", "offset", "on", "or", "order", "select", "table", "then",
    "to", "true", "union", "user", "when", "where", "with",
];

/// SQL text plus its positional parameters.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompiledQuery {
    pub sql: String,
    pub params: Vec<Value>,
}

/// Compiler state for a single [`Select`].
pub struct Compiler<'a> {
    table: &'a Table,
    sql: String,
    params: Vec<Value>,
}

impl<'a> Compiler<'a> {
    /// Compile a select to SQL text and positional parameters.
    pub fn compile(select: &'a Select) -> Result<CompiledQuery, CompileError> {
        if select.columns.is_empty() {
            return Err(CompileError::EmptyColumns {
                table: select.table.name.clone(),
            });
        }

        let mut compiler = Compiler {
            table: &select.table,
            sql: String::with_capacity(128),
            params: Vec::new(),
        };

        compiler.sql.push_str("SELECT ");
        for (i, column) in select.columns.iter().enumerate() {
            if i > 0 {
                compiler.sql.push_str(", ");
            }
            compiler.push_column(column)?;
        }

        compiler.sql.push_str(" FROM ");
        if let Some(schema) = &select.table.schema {
            compiler.sql.push_str(&quote_ident(schema));
            compiler.sql.push('.');
        }
        compiler.sql.push_str(&quote_ident(&select.table.name));

        if let Some(filter) = &select.filter {
            compiler.sql.push_str(" WHERE ");
            compiler.push_filter(filter, false)?;
        }

        if !select.order_by.is_empty() {
            compiler.sql.push_str(" ORDER BY ");
            for (i, order) in select.order_by.iter().enumerate() {
                if i > 0 {
                    compiler.sql.push_str(", ");
                }
                compiler.push_column(&order.column)?;
                compiler.sql.push_str(match order.direction {
                    OrderDirection::Asc => " ASC",
                    OrderDirection::Desc => " DESC",
                });
            }
        }

        if let Some(limit) = select.limit {
            compiler.sql.push_str(" LIMIT ");
            compiler.sql.push_str(&limit.to_string());
        }

        Ok(CompiledQuery {
            sql: compiler.sql,
            params: compiler.params,
        })
    }

    /// Push a table-qualified column, validating it exists.
    fn push_column(&mut self, column: &str) -> Result<(), CompileError> {
        if self.table.find_column(column).is_none() {
            return Err(CompileError::UnknownColumn {
                table: self.table.name.clone(),
                column: column.to_string(),
            });
        }
        self.sql.push_str(&quote_ident(&self.table.name));
        self.sql.push('.');
        self.sql.push_str(&quote_ident(column));
        Ok(())
    }

    fn push_filter(&mut self, filter: &Filter, nested: bool) -> Result<(), CompileError> {
        match filter {
            Filter::Compare { column, op, value } => {
                self.push_column(column)?;
                self.sql.push(' ');
                self.sql.push_str(op.symbol());
                self.sql.push(' ');
                self.push_param(column, value.clone());
            }
            Filter::IsNull { column } => {
                self.push_column(column)?;
                self.sql.push_str(" IS NULL");
            }
            Filter::IsNotNull { column } => {
                self.push_column(column)?;
                self.sql.push_str(" IS NOT NULL");
            }
            Filter::And(members) => self.push_group(members, " AND ", "AND", nested)?,
            Filter::Or(members) => self.push_group(members, " OR ", "OR", nested)?,
        }
        Ok(())
    }

    fn push_group(
        &mut self,
        members: &[Filter],
        separator: &str,
        kind: &'static str,
        nested: bool,
    ) -> Result<(), CompileError> {
        match members {
            [] => return Err(CompileError::EmptyGroup(kind)),
            [single] => return self.push_filter(single, nested),
            _ => {}
        }

        if nested {
            self.sql.push('(');
        }
        for (i, member) in members.iter().enumerate() {
            if i > 0 {
                self.sql.push_str(separator);
            }
            self.push_filter(member, true)?;
        }
        if nested {
            self.sql.push(')');
        }
        Ok(())
    }

    fn push_param(&mut self, column: &str, value: Value) {
        self.params.push(value);
        self.sql.push('$');
        self.sql.push_str(&self.params.len().to_string());

        let declared = self.table.find_column(column).and_then(|c| c.ty);
        if let Some(ty) = declared {
            self.sql.push_str("::");
            self.sql.push_str(ty.cast_name());
        }
    }
}

/// Quote an identifier unless it is a plain, non-reserved lower-case word.
pub fn quote_ident(ident: &str) -> String {
    let mut chars = ident.chars();
    let plain = match chars.next() {
        Some(first) => {
            (first.is_ascii_lowercase() || first == '_')
                && chars.all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
        }
        None => false,
    };

    if plain && !RESERVED.contains(&ident) {
        ident.to_string()
    } else {
        format!("\"{}\"", ident.replace('"', "\"\""))
    }
}
