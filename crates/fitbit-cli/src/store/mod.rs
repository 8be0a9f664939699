//! Duplicate-safe SQLite store
//!
//! One table per record shape, created lazily from the declared schema. The
//! store carries no unique constraints; idempotence comes from the writer
//! dropping rows whose identity key is already present. All writes for one
//! day share a single transaction, committed on success and on fatal errors
//! alike so finished work is never lost.

pub mod export;

use std::collections::{HashMap, HashSet};
use std::path::Path;

use chrono::NaiveDate;
use rusqlite::types::ValueRef;
use rusqlite::Connection;

use crate::error::Result;
use crate::model::{Cell, RowSet, TableSchema};
use crate::summary::DAILY_SUMMARY;

pub struct Store {
    conn: Connection,
}

impl Store {
    /// Open the database and begin the day's transaction
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)?;
        conn.execute_batch("BEGIN")?;
        Ok(Self { conn })
    }

    #[cfg(test)]
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("BEGIN")?;
        Ok(Self { conn })
    }

    /// Commit everything written since `open`
    pub fn commit(&self) -> Result<()> {
        self.conn.execute_batch("COMMIT")?;
        Ok(())
    }

    /// Write a batch, skipping rows whose identity key already exists.
    /// Returns the number of rows actually inserted.
    pub fn write(&mut self, batch: &RowSet) -> Result<usize> {
        if batch.is_empty() {
            return Ok(0);
        }
        let schema = batch.schema;

        // Within the batch itself, later rows win over earlier ones with
        // the same key.
        let mut last_for_key: HashMap<Vec<Cell>, usize> = HashMap::new();
        for (i, row) in batch.rows.iter().enumerate() {
            last_for_key.insert(batch.key_of(row), i);
        }
        let mut survivors: Vec<usize> = last_for_key.values().copied().collect();
        survivors.sort_unstable();

        let existing = if self.table_exists(schema.table)? {
            self.existing_keys(schema)?
        } else {
            self.create_table(schema)?;
            HashSet::new()
        };

        let placeholders = vec!["?"; schema.columns.len()].join(", ");
        let column_names: Vec<&str> = schema.columns.iter().map(|c| c.name).collect();
        let sql = format!(
            "INSERT INTO {} ({}) VALUES ({})",
            schema.table,
            column_names.join(", "),
            placeholders
        );
        let mut stmt = self.conn.prepare(&sql)?;

        let mut inserted = 0;
        for i in survivors {
            let row = &batch.rows[i];
            if existing.contains(&batch.key_of(row)) {
                continue;
            }
            stmt.execute(rusqlite::params_from_iter(row.iter()))?;
            inserted += 1;
        }
        Ok(inserted)
    }

    /// Whether a daily summary row has already been stored for this date.
    /// A store with no summary table yet has no complete days.
    pub fn is_day_complete(&self, date: NaiveDate) -> bool {
        let day = date.format("%Y-%m-%d").to_string();
        let sql = format!(
            "SELECT COUNT(*) FROM {} WHERE date = ?1",
            DAILY_SUMMARY.table
        );
        match self.conn.query_row(&sql, [&day], |r| r.get::<_, i64>(0)) {
            Ok(n) => n > 0,
            Err(_) => false,
        }
    }

    /// Distinguishes "table not created yet" from real query failures
    fn table_exists(&self, table: &str) -> Result<bool> {
        let mut stmt = self
            .conn
            .prepare("SELECT name FROM sqlite_master WHERE type = 'table' AND name = ?1")?;
        let found = stmt.exists([table])?;
        Ok(found)
    }

    fn create_table(&self, schema: &TableSchema) -> Result<()> {
        let columns: Vec<String> = schema
            .columns
            .iter()
            .map(|c| format!("{} {}", c.name, c.ty.as_sql()))
            .collect();
        let sql = format!("CREATE TABLE {} ({})", schema.table, columns.join(", "));
        self.conn.execute_batch(&sql)?;
        Ok(())
    }

    /// Identity keys of every row already in the table
    fn existing_keys(&self, schema: &TableSchema) -> Result<HashSet<Vec<Cell>>> {
        let sql = format!("SELECT {} FROM {}", schema.key.join(", "), schema.table);
        let mut stmt = self.conn.prepare(&sql)?;
        let mut keys = HashSet::new();
        let mut rows = stmt.query([])?;
        while let Some(row) = rows.next()? {
            let mut key = Vec::with_capacity(schema.key.len());
            for i in 0..schema.key.len() {
                key.push(cell_from_sql(row.get_ref(i)?));
            }
            keys.insert(key);
        }
        Ok(keys)
    }
}

fn cell_from_sql(value: ValueRef<'_>) -> Cell {
    match value {
        ValueRef::Null => Cell::Null,
        ValueRef::Integer(i) => Cell::Int(i),
        ValueRef::Real(f) => Cell::Float(f),
        ValueRef::Text(t) => Cell::Text(String::from_utf8_lossy(t).into_owned()),
        ValueRef::Blob(_) => Cell::Null,
    }
}
