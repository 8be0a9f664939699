//! Daily summary composer
//!
//! Builds the one-row-per-day overview table from payloads already fetched
//! for the day. The row marks the day as done: the presence check keys off
//! this table, so it is written last, after every per-kind table.

use chrono::NaiveDate;
use serde_json::Value;

use crate::flatten::{date_cell, heart};
use crate::model::value::Step::{Idx, Key};
use crate::model::value::{optional_array, optional_cell, walk};
use crate::model::{Cell, Column, RowSet, SqlType, TableSchema};

pub static DAILY_SUMMARY: TableSchema = TableSchema {
    table: "daily_summary",
    columns: &[
        Column { name: "date", ty: SqlType::Text },
        Column { name: "steps", ty: SqlType::Integer },
        Column { name: "calories_out", ty: SqlType::Integer },
        Column { name: "activity_calories", ty: SqlType::Integer },
        Column { name: "resting_heart_rate", ty: SqlType::Integer },
        Column { name: "sedentary_minutes", ty: SqlType::Integer },
        Column { name: "lightly_active_minutes", ty: SqlType::Integer },
        Column { name: "fairly_active_minutes", ty: SqlType::Integer },
        Column { name: "very_active_minutes", ty: SqlType::Integer },
        Column { name: "elevation", ty: SqlType::Real },
        Column { name: "floors", ty: SqlType::Integer },
        Column { name: "distance", ty: SqlType::Real },
        Column { name: "sleep_start_time", ty: SqlType::Text },
        Column { name: "sleep_end_time", ty: SqlType::Text },
        Column { name: "sleep_minutes_asleep", ty: SqlType::Integer },
        Column { name: "sleep_minutes_awake", ty: SqlType::Integer },
        Column { name: "sleep_time_in_bed", ty: SqlType::Integer },
        Column { name: "sleep_efficiency", ty: SqlType::Integer },
    ],
    key: &["date"],
};

/// Compose the day's summary row from the per-kind payloads.
///
/// Without an activity payload there is nothing to summarize and the day
/// stays incomplete. Sleep and heart payloads only enrich the row.
pub fn compose(
    activity: Option<&Value>,
    sleep: Option<&Value>,
    heart: Option<&Value>,
    date: NaiveDate,
) -> Option<RowSet> {
    let activity = activity?;

    // prefer the activity summary's resting rate, fall back to the heart payload
    let mut resting = optional_cell(activity, &[Key("summary"), Key("restingHeartRate")]);
    if resting == Cell::Null {
        if let Some(heart) = heart {
            resting = heart::resting_heart_rate(heart);
        }
    }

    let main_sleep = sleep.and_then(main_sleep_log);
    let sleep_cell = |field| {
        main_sleep
            .and_then(|log| walk(log, &[Key(field)]))
            .map(Cell::from_json)
            .unwrap_or(Cell::Null)
    };

    let mut rows = RowSet::new(&DAILY_SUMMARY);
    rows.push(vec![
        date_cell(date),
        optional_cell(activity, &[Key("summary"), Key("steps")]),
        optional_cell(activity, &[Key("summary"), Key("caloriesOut")]),
        optional_cell(activity, &[Key("summary"), Key("activityCalories")]),
        resting,
        optional_cell(activity, &[Key("summary"), Key("sedentaryMinutes")]),
        optional_cell(activity, &[Key("summary"), Key("lightlyActiveMinutes")]),
        optional_cell(activity, &[Key("summary"), Key("fairlyActiveMinutes")]),
        optional_cell(activity, &[Key("summary"), Key("veryActiveMinutes")]),
        optional_cell(activity, &[Key("summary"), Key("elevation")]),
        optional_cell(activity, &[Key("summary"), Key("floors")]),
        optional_cell(activity, &[Key("summary"), Key("distances"), Idx(0), Key("distance")]),
        sleep_cell("startTime"),
        sleep_cell("endTime"),
        sleep_cell("minutesAsleep"),
        sleep_cell("minutesAwake"),
        sleep_cell("timeInBed"),
        sleep_cell("efficiency"),
    ]);
    Some(rows)
}

/// First log flagged as the main sleep, if any
fn main_sleep_log(payload: &Value) -> Option<&Value> {
    optional_array(payload, &[Key("sleep")])
        .iter()
        .find(|log| walk(log, &[Key("isMainSleep")]).and_then(|v| v.as_bool()) == Some(true))
}
