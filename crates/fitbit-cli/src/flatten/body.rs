//! Body measurement flattener
//!
//! Joins the weight and body-fat payloads for a day into at most one row.
//! The scale endpoints echo back the nearest logged measurement, so a row
//! is produced only when the entry's own date matches the requested day.

use chrono::NaiveDate;
use serde_json::Value;

use super::date_cell;
use crate::error::Result;
use crate::model::value::Step::{Idx, Key};
use crate::model::value::{optional_cell, optional_str, require_array};
use crate::model::{Cell, Column, RowSet, SqlType, TableSchema};

pub static BODY: TableSchema = TableSchema {
    table: "body",
    columns: &[
        Column { name: "date", ty: SqlType::Text },
        Column { name: "weight", ty: SqlType::Real },
        Column { name: "bmi", ty: SqlType::Real },
        Column { name: "fat", ty: SqlType::Real },
    ],
    key: &["date"],
};

pub fn flatten(weight_payload: &Value, fat_payload: &Value, date: NaiveDate) -> Result<RowSet> {
    let day_str = date.format("%Y-%m-%d").to_string();
    require_array(weight_payload, &[Key("weight")])?;
    require_array(fat_payload, &[Key("fat")])?;

    let mut rows = RowSet::new(&BODY);
    let weighed_today = optional_str(weight_payload, &[Key("weight"), Idx(0), Key("date")])
        .map(|d| d == day_str)
        .unwrap_or(false);
    if !weighed_today {
        return Ok(rows);
    }

    let fat_today = optional_str(fat_payload, &[Key("fat"), Idx(0), Key("date")])
        .map(|d| d == day_str)
        .unwrap_or(false);
    let fat = if fat_today {
        optional_cell(fat_payload, &[Key("fat"), Idx(0), Key("fat")])
    } else {
        Cell::Null
    };

    rows.push(vec![
        date_cell(date),
        optional_cell(weight_payload, &[Key("weight"), Idx(0), Key("weight")]),
        optional_cell(weight_payload, &[Key("weight"), Idx(0), Key("bmi")]),
        fat,
    ]);
    Ok(rows)
}
