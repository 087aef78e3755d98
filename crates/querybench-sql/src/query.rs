//! Tables, filters and the `Select` builder.

use serde::Serialize;

use crate::value::{SqlType, Value};

/// A column definition on a [`Table`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Column {
    /// Column name.
    pub name: String,
    /// Declared type, used for placeholder casts. `None` renders no cast.
    pub ty: Option<SqlType>,
}

/// A table or view that queries select from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Table {
    /// Optional schema qualifier.
    pub schema: Option<String>,
    /// Table or view name.
    pub name: String,
    /// Known columns, in declaration order.
    pub columns: Vec<Column>,
}

impl Table {
    /// Create a schema-qualified table with no columns.
    pub fn new(schema: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            schema: Some(schema.into()),
            name: name.into(),
            columns: vec![],
        }
    }

    /// Create a table resolved through the search path.
    pub fn unqualified(name: impl Into<String>) -> Self {
        Self {
            schema: None,
            name: name.into(),
            columns: vec![],
        }
    }

    /// Add a typed column.
    pub fn with_column(mut self, name: impl Into<String>, ty: SqlType) -> Self {
        self.columns.push(Column {
            name: name.into(),
            ty: Some(ty),
        });
        self
    }

    /// Add a column without a declared type.
    pub fn with_untyped_column(mut self, name: impl Into<String>) -> Self {
        self.columns.push(Column {
            name: name.into(),
            ty: None,
        });
        self
    }

    /// Look up a column definition by name.
    pub fn find_column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Reference a column for use in filters and ordering.
    pub fn column(&self, name: impl Into<String>) -> ColumnRef {
        ColumnRef { name: name.into() }
    }

    /// Start a select of every declared column.
    pub fn select(&self) -> Select {
        Select {
            columns: self.columns.iter().map(|c| c.name.clone()).collect(),
            table: self.clone(),
            filter: None,
            order_by: vec![],
            limit: None,
        }
    }
}

/// A reference to a column by name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnRef {
    pub name: String,
}

impl ColumnRef {
    fn compare(&self, op: CompareOp, value: impl Into<Value>) -> Filter {
        Filter::Compare {
            column: self.name.clone(),
            op,
            value: value.into(),
        }
    }

    /// `column = value`
    pub fn eq(&self, value: impl Into<Value>) -> Filter {
        self.compare(CompareOp::Eq, value)
    }

    /// `column <> value`
    pub fn ne(&self, value: impl Into<Value>) -> Filter {
        self.compare(CompareOp::Ne, value)
    }

    /// `column < value`
    pub fn lt(&self, value: impl Into<Value>) -> Filter {
        self.compare(CompareOp::Lt, value)
    }

    /// `column <= value`
    pub fn le(&self, value: impl Into<Value>) -> Filter {
        self.compare(CompareOp::Le, value)
    }

    /// `column > value`
    pub fn gt(&self, value: impl Into<Value>) -> Filter {
        self.compare(CompareOp::Gt, value)
    }

    /// `column >= value`
    pub fn ge(&self, value: impl Into<Value>) -> Filter {
        self.compare(CompareOp::Ge, value)
    }

    /// `column IS NULL`
    pub fn is_null(&self) -> Filter {
        Filter::IsNull {
            column: self.name.clone(),
        }
    }

    /// `column IS NOT NULL`
    pub fn is_not_null(&self) -> Filter {
        Filter::IsNotNull {
            column: self.name.clone(),
        }
    }

    /// Ascending order on this column.
    pub fn asc(&self) -> OrderSpec {
        OrderSpec {
            column: self.name.clone(),
            direction: OrderDirection::Asc,
        }
    }

    /// Descending order on this column.
    pub fn desc(&self) -> OrderSpec {
        OrderSpec {
            column: self.name.clone(),
            direction: OrderDirection::Desc,
        }
    }
}

/// Binary comparison operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum CompareOp {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

impl CompareOp {
    /// The SQL operator token.
    pub fn symbol(self) -> &'static str {
        match self {
            CompareOp::Eq => "=",
            CompareOp::Ne => "<>",
            CompareOp::Lt => "<",
            CompareOp::Le => "<=",
            CompareOp::Gt => ">",
            CompareOp::Ge => ">=",
        }
    }
}

/// A WHERE predicate.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Filter {
    /// `column <op> value`
    Compare {
        column: String,
        op: CompareOp,
        value: Value,
    },
    /// `column IS NULL`
    IsNull { column: String },
    /// `column IS NOT NULL`
    IsNotNull { column: String },
    /// All members must hold.
    And(Vec<Filter>),
    /// At least one member must hold.
    Or(Vec<Filter>),
}

impl Filter {
    /// Combine with another filter using AND, flattening nested ANDs.
    pub fn and(self, other: Filter) -> Filter {
        match (self, other) {
            (Filter::And(mut left), Filter::And(right)) => {
                left.extend(right);
                Filter::And(left)
            }
            (Filter::And(mut left), other) => {
                left.push(other);
                Filter::And(left)
            }
            (this, Filter::And(mut right)) => {
                right.insert(0, this);
                Filter::And(right)
            }
            (this, other) => Filter::And(vec![this, other]),
        }
    }

    /// Combine with another filter using OR.
    pub fn or(self, other: Filter) -> Filter {
        match self {
            Filter::Or(mut members) => {
                members.push(other);
                Filter::Or(members)
            }
            this => Filter::Or(vec![this, other]),
        }
    }
}

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum OrderDirection {
    Asc,
    Desc,
}

/// An ORDER BY entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderSpec {
    pub column: String,
    pub direction: OrderDirection,
}

/// A structured SELECT over a single table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Select {
    /// Source table.
    pub table: Table,
    /// Selected column names.
    pub columns: Vec<String>,
    /// Optional WHERE predicate.
    pub filter: Option<Filter>,
    /// ORDER BY entries.
    pub order_by: Vec<OrderSpec>,
    /// Optional LIMIT.
    pub limit: Option<u64>,
}

impl Select {
    /// Replace the select list.
    pub fn columns<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.columns = columns.into_iter().map(Into::into).collect();
        self
    }

    /// Add a WHERE predicate. Repeated calls are AND-ed together.
    pub fn filter(mut self, filter: Filter) -> Self {
        self.filter = Some(match self.filter.take() {
            Some(existing) => existing.and(filter),
            None => filter,
        });
        self
    }

    /// Append an ORDER BY entry.
    pub fn order_by(mut self, order: OrderSpec) -> Self {
        self.order_by.push(order);
        self
    }

    /// Set the LIMIT.
    pub fn limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }
}
