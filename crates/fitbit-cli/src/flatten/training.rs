//! Training-log flattener
//!
//! The activity-list endpoint returns a window of recent workouts regardless
//! of the requested day, so rows are filtered to entries whose start time
//! falls on that day. Keyed by the vendor's log id: the same workout seen
//! through overlapping windows must collapse to one row.

use chrono::NaiveDate;
use serde_json::Value;

use super::date_cell;
use crate::error::Result;
use crate::model::value::Step::{Idx, Key};
use crate::model::value::{optional_cell, optional_str, require_array, required_cell};
use crate::model::{Column, RowSet, SqlType, TableSchema};

pub static TRAINING_LOG: TableSchema = TableSchema {
    table: "training_log",
    columns: &[
        Column { name: "log_id", ty: SqlType::Integer },
        Column { name: "date", ty: SqlType::Text },
        Column { name: "activity_name", ty: SqlType::Text },
        Column { name: "start_time", ty: SqlType::Text },
        Column { name: "duration_ms", ty: SqlType::Integer },
        Column { name: "calories", ty: SqlType::Integer },
        Column { name: "steps", ty: SqlType::Integer },
        Column { name: "distance", ty: SqlType::Real },
    ],
    key: &["log_id"],
};

pub fn flatten(payload: &Value, date: NaiveDate) -> Result<RowSet> {
    let day_str = date.format("%Y-%m-%d").to_string();
    let entries = require_array(payload, &[Key("activities")])?;

    let mut rows = RowSet::new(&TRAINING_LOG);
    for i in 0..entries.len() {
        let entry = |field| [Key("activities"), Idx(i), Key(field)];
        // Entries from surrounding days are expected; drop them silently.
        let on_day = optional_str(payload, &entry("startTime"))
            .map(|t| t.get(..10) == Some(day_str.as_str()))
            .unwrap_or(false);
        if !on_day {
            continue;
        }
        rows.push(vec![
            required_cell(payload, &entry("logId"))?,
            date_cell(date),
            optional_cell(payload, &entry("activityName")),
            optional_cell(payload, &entry("startTime")),
            optional_cell(payload, &entry("duration")),
            optional_cell(payload, &entry("calories")),
            optional_cell(payload, &entry("steps")),
            optional_cell(payload, &entry("distance")),
        ]);
    }
    Ok(rows)
}
