//! Per-kind payload flattening
//!
//! One pure function per record kind: raw payload (plus the date being
//! processed, since some payloads omit it) in, row batches tagged with their
//! target table and identity key out. Optional nested fields become null
//! cells; structurally required fields raise shape errors.

pub mod activity;
pub mod body;
pub mod heart;
pub mod intraday;
pub mod sleep;
pub mod steps;
pub mod training;

use chrono::NaiveDate;
use serde_json::Value;

use crate::error::Result;
use crate::model::value::Step::{Idx, Key};
use crate::model::value::{optional_cell, require_array, required_cell};
use crate::model::{Cell, RowSet, TableSchema};

/// Render a date the way every table stores it
pub(crate) fn date_cell(date: NaiveDate) -> Cell {
    Cell::Text(date.format("%Y-%m-%d").to_string())
}

/// Flatten an intraday `dataset` array into (date, time, value) rows.
///
/// The dataset lives under `{root_key}.dataset`; both the array and each
/// sample's `time` are structurally required, the sample `value` passes
/// through as received.
pub(crate) fn dataset_rows(
    payload: &Value,
    root_key: &str,
    date: NaiveDate,
    schema: &'static TableSchema,
) -> Result<RowSet> {
    let mut rows = RowSet::new(schema);
    let samples = require_array(payload, &[Key(root_key), Key("dataset")])?;
    for i in 0..samples.len() {
        let time = required_cell(payload, &[Key(root_key), Key("dataset"), Idx(i), Key("time")])?;
        let value = optional_cell(payload, &[Key(root_key), Key("dataset"), Idx(i), Key("value")]);
        rows.push(vec![date_cell(date), time, value]);
    }
    Ok(rows)
}
