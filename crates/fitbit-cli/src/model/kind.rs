//! Record kind enumeration
//!
//! One variant per category of data fetched from the API. The string form is
//! the cache key component, so renaming a variant's string invalidates the
//! on-disk cache for that kind.

use std::fmt;

/// One category of fitness data, keyed per calendar day
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordKind {
    /// Daily activity summary (goals, totals, HR zones, distances)
    ActivitySummary,
    /// 1-minute intraday series, fetched as a group
    IntradayCalories,
    IntradaySteps,
    IntradayDistance,
    IntradayFloors,
    IntradayElevation,
    /// Cached for completeness, never flattened into a table
    IntradayActivityCalories,
    /// Intraday steps plus the day-summary element
    Steps,
    /// Intraday heart rate plus the day-summary element with HR zones
    HeartRate,
    /// Sleep logs with per-minute stage data
    Sleep,
    /// Body weight log
    Weight,
    /// Body fat log
    BodyFat,
    /// Recent training activities (fixed-size window, filtered per day)
    TrainingLog,
}

impl RecordKind {
    /// Cache key component, matching the historical file naming
    pub fn as_str(&self) -> &'static str {
        match self {
            RecordKind::ActivitySummary => "activities",
            RecordKind::IntradayCalories => "activities_calories",
            RecordKind::IntradaySteps => "activities_steps",
            RecordKind::IntradayDistance => "activities_distance",
            RecordKind::IntradayFloors => "activities_floors",
            RecordKind::IntradayElevation => "activities_elevation",
            RecordKind::IntradayActivityCalories => "activities_activityCalories",
            RecordKind::Steps => "steps_1m",
            RecordKind::HeartRate => "heart_1m",
            RecordKind::Sleep => "sleep",
            RecordKind::Weight => "weight",
            RecordKind::BodyFat => "bodyfat",
            RecordKind::TrainingLog => "training",
        }
    }

    /// Intraday resource name on the vendor API, if this is an intraday kind
    pub fn intraday_resource(&self) -> Option<&'static str> {
        match self {
            RecordKind::IntradayCalories => Some("calories"),
            RecordKind::IntradaySteps | RecordKind::Steps => Some("steps"),
            RecordKind::IntradayDistance => Some("distance"),
            RecordKind::IntradayFloors => Some("floors"),
            RecordKind::IntradayElevation => Some("elevation"),
            RecordKind::IntradayActivityCalories => Some("activityCalories"),
            RecordKind::HeartRate => Some("heart"),
            _ => None,
        }
    }

    /// The intraday kinds prefetched together per day, in fetch order
    pub const INTRADAY_GROUP: [RecordKind; 6] = [
        RecordKind::IntradayCalories,
        RecordKind::IntradaySteps,
        RecordKind::IntradayDistance,
        RecordKind::IntradayFloors,
        RecordKind::IntradayElevation,
        RecordKind::IntradayActivityCalories,
    ];
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
