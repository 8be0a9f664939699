//! Heart-rate flattener
//!
//! The one-minute heart payload yields the intraday series plus a wide
//! per-day summary row with the four standard zones pivoted into columns.
//! A payload with fewer than four zones cannot fill that row and is
//! rejected as malformed.

use chrono::NaiveDate;
use serde_json::Value;

use super::dataset_rows;
use crate::error::{FitbitError, Result};
use crate::model::value::Step::{Idx, Key};
use crate::model::value::{optional_cell, require_array, required_cell};
use crate::model::{Cell, Column, RowSet, SqlType, TableSchema};

pub static INTRADAY_HEART_RATE: TableSchema = TableSchema {
    table: "intraday_heart_rate",
    columns: &[
        Column { name: "date", ty: SqlType::Text },
        Column { name: "time", ty: SqlType::Text },
        Column { name: "bpm", ty: SqlType::Integer },
    ],
    key: &["date", "time"],
};

pub static HEART_RATE_SUMMARY: TableSchema = TableSchema {
    table: "heart_rate_summary",
    columns: &[
        Column { name: "date", ty: SqlType::Text },
        Column { name: "resting_heart_rate", ty: SqlType::Integer },
        Column { name: "zone0_calories_out", ty: SqlType::Real },
        Column { name: "zone0_max", ty: SqlType::Integer },
        Column { name: "zone0_min", ty: SqlType::Integer },
        Column { name: "zone0_minutes", ty: SqlType::Integer },
        Column { name: "zone0_name", ty: SqlType::Text },
        Column { name: "zone1_calories_out", ty: SqlType::Real },
        Column { name: "zone1_max", ty: SqlType::Integer },
        Column { name: "zone1_min", ty: SqlType::Integer },
        Column { name: "zone1_minutes", ty: SqlType::Integer },
        Column { name: "zone1_name", ty: SqlType::Text },
        Column { name: "zone2_calories_out", ty: SqlType::Real },
        Column { name: "zone2_max", ty: SqlType::Integer },
        Column { name: "zone2_min", ty: SqlType::Integer },
        Column { name: "zone2_minutes", ty: SqlType::Integer },
        Column { name: "zone2_name", ty: SqlType::Text },
        Column { name: "zone3_calories_out", ty: SqlType::Real },
        Column { name: "zone3_max", ty: SqlType::Integer },
        Column { name: "zone3_min", ty: SqlType::Integer },
        Column { name: "zone3_minutes", ty: SqlType::Integer },
        Column { name: "zone3_name", ty: SqlType::Text },
    ],
    key: &["date"],
};

/// Number of zones the pivoted summary row expects
const ZONE_COUNT: usize = 4;

pub fn flatten(payload: &Value, date: NaiveDate) -> Result<Vec<RowSet>> {
    let series = dataset_rows(payload, "activities-heart-intraday", date, &INTRADAY_HEART_RATE)?;

    let zones_path = [
        Key("activities-heart"),
        Idx(0),
        Key("value"),
        Key("heartRateZones"),
    ];
    let zones = require_array(payload, &zones_path)?;
    if zones.len() < ZONE_COUNT {
        return Err(FitbitError::shape(format!(
            "expected {} heart rate zones, got {}",
            ZONE_COUNT,
            zones.len()
        )));
    }

    let mut cells = vec![super::date_cell(date), resting_heart_rate(payload)];
    for i in 0..ZONE_COUNT {
        let zone = |field| {
            [
                Key("activities-heart"),
                Idx(0),
                Key("value"),
                Key("heartRateZones"),
                Idx(i),
                Key(field),
            ]
        };
        cells.push(optional_cell(payload, &zone("caloriesOut")));
        cells.push(optional_cell(payload, &zone("max")));
        cells.push(optional_cell(payload, &zone("min")));
        cells.push(optional_cell(payload, &zone("minutes")));
        cells.push(required_cell(payload, &zone("name"))?);
    }

    let mut summary = RowSet::new(&HEART_RATE_SUMMARY);
    summary.push(cells);

    Ok(vec![series, summary])
}

/// Resting heart rate from a cached heart payload, if the payload carries one
pub fn resting_heart_rate(payload: &Value) -> Cell {
    optional_cell(
        payload,
        &[
            Key("activities-heart"),
            Idx(0),
            Key("value"),
            Key("restingHeartRate"),
        ],
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flatten::test_util::day;
    use serde_json::json;

    fn payload() -> Value {
        json!({
            "activities-heart": [{
                "dateTime": "2019-05-12",
                "value": {
                    "restingHeartRate": 55,
                    "heartRateZones": [
                        {"name": "Out of Range", "caloriesOut": 1200.5, "max": 91, "min": 30, "minutes": 800},
                        {"name": "Fat Burn", "caloriesOut": 500.0, "max": 127, "min": 91, "minutes": 100},
                        {"name": "Cardio", "caloriesOut": 150.0, "max": 154, "min": 127, "minutes": 20},
                        {"name": "Peak", "caloriesOut": 30.0, "max": 220, "min": 154, "minutes": 2}
                    ]
                }
            }],
            "activities-heart-intraday": {
                "dataset": [
                    {"time": "00:00:00", "value": 62},
                    {"time": "00:01:00", "value": 60}
                ],
                "datasetInterval": 1,
                "datasetType": "minute"
            }
        })
    }

    #[test]
    fn test_series_rows() {
        let batches = flatten(&payload(), day()).unwrap();
        assert_eq!(batches[0].schema.table, "intraday_heart_rate");
        assert_eq!(batches[0].rows.len(), 2);
        assert_eq!(batches[0].rows[0][2], Cell::Int(62));
    }

    #[test]
    fn test_summary_pivots_zones() {
        let batches = flatten(&payload(), day()).unwrap();
        let row = &batches[1].rows[0];
        assert_eq!(row.len(), HEART_RATE_SUMMARY.columns.len());
        assert_eq!(row[1], Cell::Int(55)); // resting_heart_rate
        assert_eq!(row[6], Cell::text("Out of Range")); // zone0_name
        assert_eq!(row[21], Cell::text("Peak")); // zone3_name
        assert_eq!(row[17], Cell::Float(30.0)); // zone3_calories_out
    }

    #[test]
    fn test_missing_resting_rate_is_null() {
        let mut p = payload();
        p["activities-heart"][0]["value"]
            .as_object_mut()
            .unwrap()
            .remove("restingHeartRate");
        let batches = flatten(&p, day()).unwrap();
        assert_eq!(batches[1].rows[0][1], Cell::Null);
    }

    #[test]
    fn test_short_zone_list_is_shape_error() {
        let mut p = payload();
        p["activities-heart"][0]["value"]["heartRateZones"]
            .as_array_mut()
            .unwrap()
            .truncate(3);
        let err = flatten(&p, day()).unwrap_err();
        assert!(matches!(err, FitbitError::Shape(_)));
    }

    #[test]
    fn test_resting_heart_rate_helper() {
        assert_eq!(resting_heart_rate(&payload()), Cell::Int(55));
        assert_eq!(resting_heart_rate(&json!({})), Cell::Null);
    }
}
