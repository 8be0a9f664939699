//! Intraday series flatteners (floors, elevation, distance, calories)
//!
//! Steps and heart rate have their own modules because their day-summary
//! element produces an extra table; the four kinds here are plain
//! one-row-per-sample series.

use chrono::NaiveDate;
use serde_json::Value;

use super::dataset_rows;
use crate::error::{FitbitError, Result};
use crate::model::{Column, RecordKind, RowSet, SqlType, TableSchema};

pub static INTRADAY_FLOORS: TableSchema = TableSchema {
    table: "intraday_floors",
    columns: &[
        Column { name: "date", ty: SqlType::Text },
        Column { name: "time", ty: SqlType::Text },
        Column { name: "floors", ty: SqlType::Integer },
    ],
    key: &["date", "time"],
};

pub static INTRADAY_ELEVATION: TableSchema = TableSchema {
    table: "intraday_elevation",
    columns: &[
        Column { name: "date", ty: SqlType::Text },
        Column { name: "time", ty: SqlType::Text },
        Column { name: "elevation", ty: SqlType::Real },
    ],
    key: &["date", "time"],
};

pub static INTRADAY_DISTANCE: TableSchema = TableSchema {
    table: "intraday_distance",
    columns: &[
        Column { name: "date", ty: SqlType::Text },
        Column { name: "time", ty: SqlType::Text },
        Column { name: "distance", ty: SqlType::Real },
    ],
    key: &["date", "time"],
};

pub static INTRADAY_CALORIES: TableSchema = TableSchema {
    table: "intraday_calories",
    columns: &[
        Column { name: "date", ty: SqlType::Text },
        Column { name: "time", ty: SqlType::Text },
        Column { name: "calories", ty: SqlType::Real },
    ],
    key: &["date", "time"],
};

/// Target table and payload root for a flattened intraday kind, if any.
/// `IntradaySteps` and `IntradayActivityCalories` are cached but not
/// flattened here (steps get their table via the `steps_1m` kind).
fn target(kind: RecordKind) -> Option<(&'static str, &'static TableSchema)> {
    match kind {
        RecordKind::IntradayFloors => Some(("activities-floors-intraday", &INTRADAY_FLOORS)),
        RecordKind::IntradayElevation => {
            Some(("activities-elevation-intraday", &INTRADAY_ELEVATION))
        }
        RecordKind::IntradayDistance => Some(("activities-distance-intraday", &INTRADAY_DISTANCE)),
        RecordKind::IntradayCalories => Some(("activities-calories-intraday", &INTRADAY_CALORIES)),
        _ => None,
    }
}

/// True when this intraday kind produces a table of its own
pub fn is_flattened(kind: RecordKind) -> bool {
    target(kind).is_some()
}

/// One row per timestamped sample for the day
pub fn flatten(kind: RecordKind, payload: &Value, date: NaiveDate) -> Result<RowSet> {
    let (root_key, schema) = target(kind)
        .ok_or_else(|| FitbitError::shape(format!("{} is not a flattened intraday kind", kind)))?;
    dataset_rows(payload, root_key, date, schema)
}
