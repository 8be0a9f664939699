//! Sleep flattener
//!
//! Three batches per day: one row per sleep log, one aggregate summary row,
//! and one row per recorded minute of every log. The per-minute rows carry a
//! derived stage label mapped from the vendor's numeric stage code.

use chrono::NaiveDate;
use serde_json::Value;

use super::date_cell;
use crate::error::Result;
use crate::model::value::Step::{Idx, Key};
use crate::model::value::{optional_cell, optional_str, require, require_array, walk};
use crate::model::{Cell, Column, RowSet, SqlType, TableSchema};

pub static SLEEP_LOGS: TableSchema = TableSchema {
    table: "sleep_logs",
    columns: &[
        Column { name: "date", ty: SqlType::Text },
        Column { name: "log_index", ty: SqlType::Integer },
        Column { name: "start_time", ty: SqlType::Text },
        Column { name: "end_time", ty: SqlType::Text },
        Column { name: "time_in_bed", ty: SqlType::Integer },
        Column { name: "awake_count", ty: SqlType::Integer },
        Column { name: "awake_duration", ty: SqlType::Integer },
        Column { name: "awakenings_count", ty: SqlType::Integer },
        Column { name: "duration_ms", ty: SqlType::Integer },
        Column { name: "efficiency", ty: SqlType::Integer },
        Column { name: "is_main_sleep", ty: SqlType::Integer },
        Column { name: "log_id", ty: SqlType::Integer },
        Column { name: "minutes_after_wakeup", ty: SqlType::Integer },
        Column { name: "minutes_asleep", ty: SqlType::Integer },
        Column { name: "minutes_awake", ty: SqlType::Integer },
        Column { name: "minutes_to_fall_asleep", ty: SqlType::Integer },
        Column { name: "restless_count", ty: SqlType::Integer },
        Column { name: "restless_duration", ty: SqlType::Integer },
    ],
    key: &["date", "log_index"],
};

pub static SLEEP_SUMMARY: TableSchema = TableSchema {
    table: "sleep_summary",
    columns: &[
        Column { name: "date", ty: SqlType::Text },
        Column { name: "total_minutes_asleep", ty: SqlType::Integer },
        Column { name: "total_sleep_records", ty: SqlType::Integer },
        Column { name: "total_time_in_bed", ty: SqlType::Integer },
        Column { name: "stage_deep", ty: SqlType::Integer },
        Column { name: "stage_light", ty: SqlType::Integer },
        Column { name: "stage_rem", ty: SqlType::Integer },
        Column { name: "stage_wake", ty: SqlType::Integer },
    ],
    key: &["date"],
};

pub static SLEEP_MINUTES: TableSchema = TableSchema {
    table: "sleep_minutes",
    columns: &[
        Column { name: "date", ty: SqlType::Text },
        Column { name: "log_id", ty: SqlType::Integer },
        Column { name: "time", ty: SqlType::Text },
        Column { name: "stage_code", ty: SqlType::Integer },
        Column { name: "stage", ty: SqlType::Text },
    ],
    key: &["date", "log_id", "time"],
};

/// Map the vendor's numeric sleep-stage code to its label.
/// Codes outside 1..=3 have no mapping.
pub fn stage_label(code: &Value) -> Option<&'static str> {
    let code = code
        .as_i64()
        .or_else(|| code.as_str().and_then(|s| s.parse().ok()))?;
    match code {
        1 => Some("Asleep"),
        2 => Some("Restless"),
        3 => Some("Awake"),
        _ => None,
    }
}

pub fn flatten(payload: &Value, date: NaiveDate) -> Result<Vec<RowSet>> {
    let logs = require_array(payload, &[Key("sleep")])?;

    let mut log_rows = RowSet::new(&SLEEP_LOGS);
    for i in 0..logs.len() {
        let log = |field| [Key("sleep"), Idx(i), Key(field)];
        // dateOfSleep is usually present; fall back to the requested day
        let log_date = optional_str(payload, &log("dateOfSleep"))
            .map(Cell::text)
            .unwrap_or_else(|| date_cell(date));
        log_rows.push(vec![
            log_date,
            Cell::Int(i as i64),
            optional_cell(payload, &log("startTime")),
            optional_cell(payload, &log("endTime")),
            optional_cell(payload, &log("timeInBed")),
            optional_cell(payload, &log("awakeCount")),
            optional_cell(payload, &log("awakeDuration")),
            optional_cell(payload, &log("awakeningsCount")),
            optional_cell(payload, &log("duration")),
            optional_cell(payload, &log("efficiency")),
            optional_cell(payload, &log("isMainSleep")),
            optional_cell(payload, &log("logId")),
            optional_cell(payload, &log("minutesAfterWakeup")),
            optional_cell(payload, &log("minutesAsleep")),
            optional_cell(payload, &log("minutesAwake")),
            optional_cell(payload, &log("minutesToFallAsleep")),
            optional_cell(payload, &log("restlessCount")),
            optional_cell(payload, &log("restlessDuration")),
        ]);
    }

    // The aggregate summary object is structurally required even on
    // sleepless days; stage minutes are null when the vendor reported none.
    require(payload, &[Key("summary")])?;
    let mut summary = RowSet::new(&SLEEP_SUMMARY);
    summary.push(vec![
        date_cell(date),
        optional_cell(payload, &[Key("summary"), Key("totalMinutesAsleep")]),
        optional_cell(payload, &[Key("summary"), Key("totalSleepRecords")]),
        optional_cell(payload, &[Key("summary"), Key("totalTimeInBed")]),
        optional_cell(payload, &[Key("summary"), Key("stages"), Key("deep")]),
        optional_cell(payload, &[Key("summary"), Key("stages"), Key("light")]),
        optional_cell(payload, &[Key("summary"), Key("stages"), Key("rem")]),
        optional_cell(payload, &[Key("summary"), Key("stages"), Key("wake")]),
    ]);

    let mut minutes = RowSet::new(&SLEEP_MINUTES);
    for i in 0..logs.len() {
        let log_id = optional_cell(payload, &[Key("sleep"), Idx(i), Key("logId")]);
        let samples = require_array(payload, &[Key("sleep"), Idx(i), Key("minuteData")])?;
        for (j, sample) in samples.iter().enumerate() {
            let time = optional_cell(payload, &[Key("sleep"), Idx(i), Key("minuteData"), Idx(j), Key("dateTime")]);
            let code = walk(sample, &[Key("value")]);
            let stage = code
                .and_then(stage_label)
                .map(Cell::text)
                .unwrap_or(Cell::Null);
            let code_cell = code.map(Cell::from_json).unwrap_or(Cell::Null);
            minutes.push(vec![date_cell(date), log_id.clone(), time, code_cell, stage]);
        }
    }

    Ok(vec![log_rows, summary, minutes])
}
