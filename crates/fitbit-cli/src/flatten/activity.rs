//! Daily activity summary flattener
//!
//! One payload yields three batches: the wide per-day summary row, one row
//! per distance-breakdown entry, and one row per heart-rate zone. The
//! `summary` object is structurally required; the `goals` object is optional
//! and its absence nulls the goal columns.

use chrono::NaiveDate;
use serde_json::Value;

use super::date_cell;
use crate::error::Result;
use crate::model::value::Step::{Idx, Key};
use crate::model::value::{optional_cell, require, require_array, required_cell};
use crate::model::{Cell, Column, RowSet, SqlType, TableSchema};

pub static ACTIVITY_SUMMARY: TableSchema = TableSchema {
    table: "activity_summary",
    columns: &[
        Column { name: "date", ty: SqlType::Text },
        Column { name: "goal_active_minutes", ty: SqlType::Integer },
        Column { name: "goal_calories_out", ty: SqlType::Integer },
        Column { name: "goal_distance", ty: SqlType::Real },
        Column { name: "goal_floors", ty: SqlType::Integer },
        Column { name: "goal_steps", ty: SqlType::Integer },
        Column { name: "active_score", ty: SqlType::Integer },
        Column { name: "steps", ty: SqlType::Integer },
        Column { name: "distance", ty: SqlType::Real },
        Column { name: "elevation", ty: SqlType::Real },
        Column { name: "floors", ty: SqlType::Integer },
        Column { name: "resting_heart_rate", ty: SqlType::Integer },
        Column { name: "activity_calories", ty: SqlType::Integer },
        Column { name: "calories_bmr", ty: SqlType::Integer },
        Column { name: "marginal_calories", ty: SqlType::Integer },
        Column { name: "calories_out", ty: SqlType::Integer },
        Column { name: "sedentary_minutes", ty: SqlType::Integer },
        Column { name: "lightly_active_minutes", ty: SqlType::Integer },
        Column { name: "fairly_active_minutes", ty: SqlType::Integer },
        Column { name: "very_active_minutes", ty: SqlType::Integer },
    ],
    key: &["date"],
};

pub static ACTIVITY_DISTANCES: TableSchema = TableSchema {
    table: "activity_distances",
    columns: &[
        Column { name: "date", ty: SqlType::Text },
        Column { name: "activity", ty: SqlType::Text },
        Column { name: "distance", ty: SqlType::Real },
    ],
    key: &["date", "activity"],
};

pub static HEART_RATE_ZONES: TableSchema = TableSchema {
    table: "heart_rate_zones",
    columns: &[
        Column { name: "date", ty: SqlType::Text },
        Column { name: "name", ty: SqlType::Text },
        Column { name: "zone_index", ty: SqlType::Integer },
        Column { name: "minutes", ty: SqlType::Integer },
        Column { name: "calories_out", ty: SqlType::Real },
        Column { name: "min_bpm", ty: SqlType::Integer },
        Column { name: "max_bpm", ty: SqlType::Integer },
    ],
    key: &["date", "name"],
};

pub fn flatten(payload: &Value, date: NaiveDate) -> Result<Vec<RowSet>> {
    // A day that passed the presence check but has no summary object is a
    // data-integrity problem, not a nullable field.
    require(payload, &[Key("summary")])?;

    let mut summary = RowSet::new(&ACTIVITY_SUMMARY);
    summary.push(vec![
        date_cell(date),
        optional_cell(payload, &[Key("goals"), Key("activeMinutes")]),
        optional_cell(payload, &[Key("goals"), Key("caloriesOut")]),
        optional_cell(payload, &[Key("goals"), Key("distance")]),
        optional_cell(payload, &[Key("goals"), Key("floors")]),
        optional_cell(payload, &[Key("goals"), Key("steps")]),
        optional_cell(payload, &[Key("summary"), Key("activeScore")]),
        optional_cell(payload, &[Key("summary"), Key("steps")]),
        optional_cell(payload, &[Key("summary"), Key("distances"), Idx(0), Key("distance")]),
        optional_cell(payload, &[Key("summary"), Key("elevation")]),
        optional_cell(payload, &[Key("summary"), Key("floors")]),
        optional_cell(payload, &[Key("summary"), Key("restingHeartRate")]),
        optional_cell(payload, &[Key("summary"), Key("activityCalories")]),
        optional_cell(payload, &[Key("summary"), Key("caloriesBMR")]),
        optional_cell(payload, &[Key("summary"), Key("marginalCalories")]),
        optional_cell(payload, &[Key("summary"), Key("caloriesOut")]),
        optional_cell(payload, &[Key("summary"), Key("sedentaryMinutes")]),
        optional_cell(payload, &[Key("summary"), Key("lightlyActiveMinutes")]),
        optional_cell(payload, &[Key("summary"), Key("fairlyActiveMinutes")]),
        optional_cell(payload, &[Key("summary"), Key("veryActiveMinutes")]),
    ]);

    let mut distances = RowSet::new(&ACTIVITY_DISTANCES);
    let entries = require_array(payload, &[Key("summary"), Key("distances")])?;
    for i in 0..entries.len() {
        distances.push(vec![
            date_cell(date),
            required_cell(payload, &[Key("summary"), Key("distances"), Idx(i), Key("activity")])?,
            optional_cell(payload, &[Key("summary"), Key("distances"), Idx(i), Key("distance")]),
        ]);
    }

    let mut zones = RowSet::new(&HEART_RATE_ZONES);
    let zone_entries = require_array(payload, &[Key("summary"), Key("heartRateZones")])?;
    for i in 0..zone_entries.len() {
        let zone = |field| [Key("summary"), Key("heartRateZones"), Idx(i), Key(field)];
        zones.push(vec![
            date_cell(date),
            required_cell(payload, &zone("name"))?,
            Cell::Int(i as i64),
            optional_cell(payload, &zone("minutes")),
            optional_cell(payload, &zone("caloriesOut")),
            optional_cell(payload, &zone("min")),
            optional_cell(payload, &zone("max")),
        ]);
    }

    Ok(vec![summary, distances, zones])
}
