//! Step-count flattener
//!
//! The one-minute steps payload carries both the intraday series and a
//! single-element day summary; each lands in its own table.

use chrono::NaiveDate;
use serde_json::Value;

use super::dataset_rows;
use crate::error::Result;
use crate::model::value::Step::{Idx, Key};
use crate::model::value::required_cell;
use crate::model::{Column, RowSet, SqlType, TableSchema};

pub static INTRADAY_STEPS: TableSchema = TableSchema {
    table: "intraday_steps",
    columns: &[
        Column { name: "date", ty: SqlType::Text },
        Column { name: "time", ty: SqlType::Text },
        Column { name: "steps", ty: SqlType::Integer },
    ],
    key: &["date", "time"],
};

pub static STEPS_SUMMARY: TableSchema = TableSchema {
    table: "steps_summary",
    columns: &[
        Column { name: "date", ty: SqlType::Text },
        Column { name: "steps", ty: SqlType::Integer },
    ],
    key: &["date"],
};

pub fn flatten(payload: &Value, date: NaiveDate) -> Result<Vec<RowSet>> {
    let series = dataset_rows(payload, "activities-steps-intraday", date, &INTRADAY_STEPS)?;

    // Day total comes from the single-element summary array, which carries
    // the vendor's own date string rather than the requested one.
    let mut summary = RowSet::new(&STEPS_SUMMARY);
    summary.push(vec![
        required_cell(payload, &[Key("activities-steps"), Idx(0), Key("dateTime")])?,
        required_cell(payload, &[Key("activities-steps"), Idx(0), Key("value")])?,
    ]);

    Ok(vec![series, summary])
}
