//! The fixed statement catalog for the `product` table.
//!
//! Every user-issued operation maps to exactly one of these templates;
//! arguments are bound positionally, never spliced into the SQL text.

use rusqlite::types::{ToSql, ToSqlOutput, ValueRef};

use crate::record::{NewRecord, Record, RecordId};

/// Name of the single backing table.
pub const TABLE: &str = "product";

/// Core value types for statement parameters
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Integer(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Real(value)
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Text(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Text(value.to_string())
    }
}

impl ToSql for Value {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(match self {
            Value::Null => ToSqlOutput::Borrowed(ValueRef::Null),
            Value::Integer(i) => ToSqlOutput::Borrowed(ValueRef::Integer(*i)),
            Value::Real(r) => ToSqlOutput::Borrowed(ValueRef::Real(*r)),
            Value::Text(s) => ToSqlOutput::Borrowed(ValueRef::Text(s.as_bytes())),
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Statement {
    Insert,
    SelectAll,
    UpdateById,
    DeleteById,
}

impl Statement {
    pub const ALL: [Statement; 4] = [
        Statement::Insert,
        Statement::SelectAll,
        Statement::UpdateById,
        Statement::DeleteById,
    ];

    pub const fn sql(self) -> &'static str {
        match self {
            Statement::Insert => "INSERT INTO product (name, price, quantity) VALUES (?1, ?2, ?3)",
            Statement::SelectAll => "SELECT id, name, price, quantity FROM product ORDER BY id",
            Statement::UpdateById => {
                "UPDATE product SET name = ?1, price = ?2, quantity = ?3 WHERE id = ?4"
            }
            Statement::DeleteById => "DELETE FROM product WHERE id = ?1",
        }
    }

    /// Number of positional parameters the template expects.
    pub const fn arity(self) -> usize {
        match self {
            Statement::Insert => 3,
            Statement::SelectAll => 0,
            Statement::UpdateById => 4,
            Statement::DeleteById => 1,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            Statement::Insert => "insert",
            Statement::SelectAll => "select-all",
            Statement::UpdateById => "update",
            Statement::DeleteById => "delete",
        }
    }

    pub const fn is_mutating(self) -> bool {
        !matches!(self, Statement::SelectAll)
    }
}

/// A template together with the values bound to it.
#[derive(Debug, Clone, PartialEq)]
pub struct BoundStatement {
    statement: Statement,
    params: Vec<Value>,
}

impl BoundStatement {
    pub fn insert(record: &NewRecord) -> Self {
        Self {
            statement: Statement::Insert,
            params: vec![
                record.name.as_str().into(),
                record.unit_price.into(),
                record.quantity.into(),
            ],
        }
    }

    pub fn select_all() -> Self {
        Self {
            statement: Statement::SelectAll,
            params: Vec::new(),
        }
    }

    pub fn update(record: &Record) -> Self {
        Self {
            statement: Statement::UpdateById,
            params: vec![
                record.name.as_str().into(),
                record.unit_price.into(),
                record.quantity.into(),
                record.id.into(),
            ],
        }
    }

    pub fn delete(id: RecordId) -> Self {
        Self {
            statement: Statement::DeleteById,
            params: vec![id.into()],
        }
    }

    pub fn statement(&self) -> Statement {
        self.statement
    }

    pub fn params(&self) -> &[Value] {
        &self.params
    }
}
