//! Flat rows with declared schemas and identity keys
//!
//! Every target table declares its columns and the subset forming the
//! identity key. The duplicate-safe writer relies on the key declaration;
//! uniqueness is enforced at the application level, not by the store.

use rusqlite::types::{ToSqlOutput, Value as SqlValue};
use rusqlite::ToSql;
use serde_json::Value;

/// One field value in a flat row
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Null,
    Int(i64),
    Float(f64),
    Text(String),
    Bool(bool),
}

impl Cell {
    /// Convert a scalar JSON value; non-scalars collapse to `Null`
    pub fn from_json(v: &Value) -> Cell {
        match v {
            Value::Null => Cell::Null,
            Value::Bool(b) => Cell::Bool(*b),
            Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Cell::Int(i)
                } else {
                    Cell::Float(n.as_f64().unwrap_or(f64::NAN))
                }
            }
            Value::String(s) => Cell::Text(s.clone()),
            Value::Array(_) | Value::Object(_) => Cell::Null,
        }
    }

    pub fn text(s: impl Into<String>) -> Cell {
        Cell::Text(s.into())
    }

    /// CSV rendering; `Null` becomes the empty field
    pub fn to_csv_field(&self) -> String {
        match self {
            Cell::Null => String::new(),
            Cell::Int(i) => i.to_string(),
            Cell::Float(f) => f.to_string(),
            Cell::Text(s) => s.clone(),
            Cell::Bool(b) => b.to_string(),
        }
    }
}

impl Eq for Cell {}

impl std::hash::Hash for Cell {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        match self {
            Cell::Null => 0u8.hash(state),
            Cell::Int(i) => {
                1u8.hash(state);
                i.hash(state);
            }
            Cell::Float(f) => {
                2u8.hash(state);
                f.to_bits().hash(state);
            }
            Cell::Text(s) => {
                3u8.hash(state);
                s.hash(state);
            }
            Cell::Bool(b) => {
                4u8.hash(state);
                b.hash(state);
            }
        }
    }
}

impl ToSql for Cell {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(match self {
            Cell::Null => ToSqlOutput::Owned(SqlValue::Null),
            Cell::Int(i) => ToSqlOutput::Owned(SqlValue::Integer(*i)),
            Cell::Float(f) => ToSqlOutput::Owned(SqlValue::Real(*f)),
            Cell::Text(s) => ToSqlOutput::Borrowed(rusqlite::types::ValueRef::Text(s.as_bytes())),
            Cell::Bool(b) => ToSqlOutput::Owned(SqlValue::Integer(i64::from(*b))),
        })
    }
}

/// SQLite column affinity for a declared column
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SqlType {
    Text,
    Integer,
    Real,
}

impl SqlType {
    pub fn as_sql(&self) -> &'static str {
        match self {
            SqlType::Text => "TEXT",
            SqlType::Integer => "INTEGER",
            SqlType::Real => "REAL",
        }
    }
}

/// Declared column of a target table
#[derive(Debug, Clone, Copy)]
pub struct Column {
    pub name: &'static str,
    pub ty: SqlType,
}

/// Schema of a target table, including its identity key
#[derive(Debug)]
pub struct TableSchema {
    pub table: &'static str,
    pub columns: &'static [Column],
    /// Column names whose combined value must be unique within the table
    pub key: &'static [&'static str],
}

impl TableSchema {
    /// Positions of the identity-key columns within `columns`
    pub fn key_indexes(&self) -> Vec<usize> {
        self.key
            .iter()
            .filter_map(|k| self.columns.iter().position(|c| c.name == *k))
            .collect()
    }
}

/// A batch of rows bound for one table
#[derive(Debug)]
pub struct RowSet {
    pub schema: &'static TableSchema,
    pub rows: Vec<Vec<Cell>>,
}

impl RowSet {
    pub fn new(schema: &'static TableSchema) -> Self {
        Self {
            schema,
            rows: Vec::new(),
        }
    }

    /// Append a row; the caller is responsible for matching the column order
    pub fn push(&mut self, row: Vec<Cell>) {
        debug_assert_eq!(row.len(), self.schema.columns.len());
        self.rows.push(row);
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Collapse in-batch duplicate keys, keeping the last occurrence
    pub fn dedup_keep_last(&mut self) {
        let rows = std::mem::take(&mut self.rows);
        let mut seen = std::collections::HashSet::new();
        let mut kept: Vec<Vec<Cell>> = Vec::with_capacity(rows.len());
        for row in rows.into_iter().rev() {
            if seen.insert(self.key_of(&row)) {
                kept.push(row);
            }
        }
        kept.reverse();
        self.rows = kept;
    }

    /// Identity-key projection of one row
    pub fn key_of(&self, row: &[Cell]) -> Vec<Cell> {
        self.schema
            .key_indexes()
            .iter()
            .map(|&i| row[i].clone())
            .collect()
    }
}
