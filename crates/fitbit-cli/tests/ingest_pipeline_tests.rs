//! End-to-end pipeline tests with a canned vendor source

use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::NaiveDate;
use serde_json::{json, Value};
use tempfile::TempDir;

use fitbit_cli::cache::ResponseCache;
use fitbit_cli::client::{OfflineSource, VendorSource};
use fitbit_cli::config::DataPaths;
use fitbit_cli::ingest::{IngestOptions, Ingestor};
use fitbit_cli::model::RecordKind;
use fitbit_cli::{FitbitError, Result};

fn day() -> NaiveDate {
    NaiveDate::from_ymd_opt(2019, 5, 12).unwrap()
}

fn zones() -> Value {
    json!([
        {"name": "Out of Range", "caloriesOut": 1200.5, "max": 91, "min": 30, "minutes": 800},
        {"name": "Fat Burn", "caloriesOut": 500.0, "max": 127, "min": 91, "minutes": 100},
        {"name": "Cardio", "caloriesOut": 150.0, "max": 154, "min": 127, "minutes": 20},
        {"name": "Peak", "caloriesOut": 30.0, "max": 220, "min": 154, "minutes": 2}
    ])
}

/// A plausible payload for any (kind, date)
fn payload_for(kind: RecordKind, date: NaiveDate) -> Value {
    let day = date.format("%Y-%m-%d").to_string();
    match kind {
        RecordKind::ActivitySummary => json!({
            "goals": {"activeMinutes": 30, "caloriesOut": 2500, "distance": 8.05,
                      "floors": 10, "steps": 10000},
            "summary": {
                "steps": 9083, "caloriesOut": 2712, "activityCalories": 1234,
                "restingHeartRate": 55, "sedentaryMinutes": 662,
                "lightlyActiveMinutes": 180, "fairlyActiveMinutes": 35,
                "veryActiveMinutes": 44, "elevation": 12.19, "floors": 4,
                "caloriesBMR": 1518, "marginalCalories": 800, "activeScore": -1,
                "distances": [{"activity": "total", "distance": 6.68}],
                "heartRateZones": zones()
            }
        }),
        RecordKind::Sleep => json!({
            "sleep": [{
                "dateOfSleep": day,
                "startTime": format!("{}T00:10:00.000", day),
                "endTime": format!("{}T07:20:00.000", day),
                "timeInBed": 430, "duration": 25800000_i64, "efficiency": 94,
                "isMainSleep": true, "logId": 9000,
                "minutesAsleep": 405, "minutesAwake": 25,
                "minuteData": [
                    {"dateTime": "00:10:00", "value": "1"},
                    {"dateTime": "00:11:00", "value": "2"}
                ]
            }],
            "summary": {"totalMinutesAsleep": 405, "totalSleepRecords": 1, "totalTimeInBed": 430}
        }),
        RecordKind::Weight => json!({"weight": [{"date": day, "weight": 71.2, "bmi": 22.4}]}),
        RecordKind::BodyFat => json!({"fat": [{"date": day, "fat": 17.5}]}),
        RecordKind::Steps => json!({
            "activities-steps": [{"dateTime": day, "value": "9083"}],
            "activities-steps-intraday": {"dataset": [
                {"time": "00:00:00", "value": 0},
                {"time": "00:01:00", "value": 24}
            ]}
        }),
        RecordKind::HeartRate => json!({
            "activities-heart": [{"dateTime": day,
                "value": {"restingHeartRate": 55, "heartRateZones": zones()}}],
            "activities-heart-intraday": {"dataset": [{"time": "00:00:00", "value": 62}]}
        }),
        RecordKind::TrainingLog => json!({"activities": [{
            "logId": 4242, "activityName": "Run",
            "startTime": format!("{}T07:30:00.000+02:00", day),
            "duration": 1800000, "calories": 320, "steps": 4500, "distance": 5.1
        }]}),
        intraday => {
            let resource = intraday.intraday_resource().unwrap();
            let mut map = serde_json::Map::new();
            map.insert(
                format!("activities-{}", resource),
                json!([{"dateTime": day, "value": "0"}]),
            );
            map.insert(
                format!("activities-{}-intraday", resource),
                json!({"dataset": [
                    {"time": "00:00:00", "value": 1},
                    {"time": "00:01:00", "value": 2}
                ]}),
            );
            Value::Object(map)
        }
    }
}

#[derive(Clone)]
struct CannedSource {
    log: Arc<Mutex<Vec<RecordKind>>>,
    rate_limits: Arc<Mutex<u32>>,
    fail_on: Option<RecordKind>,
}

impl CannedSource {
    fn new() -> Self {
        Self {
            log: Arc::new(Mutex::new(Vec::new())),
            rate_limits: Arc::new(Mutex::new(0)),
            fail_on: None,
        }
    }

    fn rate_limited_once() -> Self {
        let source = Self::new();
        *source.rate_limits.lock().unwrap() = 1;
        source
    }

    fn failing_on(kind: RecordKind) -> Self {
        let mut source = Self::new();
        source.fail_on = Some(kind);
        source
    }

    fn fetch_count(&self) -> usize {
        self.log.lock().unwrap().len()
    }
}

impl VendorSource for CannedSource {
    async fn fetch(&mut self, kind: RecordKind, date: NaiveDate) -> Result<Value> {
        {
            let mut limits = self.rate_limits.lock().unwrap();
            if *limits > 0 {
                *limits -= 1;
                return Err(FitbitError::RateLimited);
            }
        }
        if self.fail_on == Some(kind) {
            return Err(FitbitError::Other("simulated outage".to_string()));
        }
        self.log.lock().unwrap().push(kind);
        Ok(payload_for(kind, date))
    }
}

fn options(start: NaiveDate, limit: u32) -> IngestOptions {
    let mut opts = IngestOptions::new(start);
    opts.limit = limit;
    opts
}

async fn run_with(source: impl VendorSource, temp: &TempDir, opts: IngestOptions) -> Result<()> {
    let paths = DataPaths::new(temp.path());
    paths.ensure()?;
    let cache = ResponseCache::new(paths.cache_dir(), true);
    Ingestor::new(source, cache, paths, opts).run().await
}

fn table_count(temp: &TempDir, table: &str) -> i64 {
    let conn = rusqlite::Connection::open(temp.path().join("fitbit.db")).unwrap();
    conn.query_row(&format!("SELECT COUNT(*) FROM {}", table), [], |r| r.get(0))
        .unwrap()
}

#[tokio::test]
async fn test_full_day_populates_every_table() {
    let temp = TempDir::new().unwrap();
    let source = CannedSource::new();

    run_with(source.clone(), &temp, options(day(), 1)).await.unwrap();

    // one fetch per record kind
    assert_eq!(source.fetch_count(), 13);
    assert_eq!(table_count(&temp, "daily_summary"), 1);
    assert_eq!(table_count(&temp, "activity_summary"), 1);
    assert_eq!(table_count(&temp, "activity_distances"), 1);
    assert_eq!(table_count(&temp, "heart_rate_zones"), 4);
    assert_eq!(table_count(&temp, "intraday_calories"), 2);
    assert_eq!(table_count(&temp, "intraday_steps"), 2);
    assert_eq!(table_count(&temp, "intraday_heart_rate"), 1);
    assert_eq!(table_count(&temp, "sleep_logs"), 1);
    assert_eq!(table_count(&temp, "sleep_minutes"), 2);
    assert_eq!(table_count(&temp, "sleep_summary"), 1);
    assert_eq!(table_count(&temp, "steps_summary"), 1);
    assert_eq!(table_count(&temp, "heart_rate_summary"), 1);
    assert_eq!(table_count(&temp, "training_log"), 1);
    assert_eq!(table_count(&temp, "body"), 1);
}

#[tokio::test]
async fn test_complete_day_is_skipped_without_fetching() {
    let temp = TempDir::new().unwrap();
    run_with(CannedSource::new(), &temp, options(day(), 1)).await.unwrap();

    let second = CannedSource::new();
    run_with(second.clone(), &temp, options(day(), 1)).await.unwrap();

    assert_eq!(second.fetch_count(), 0);
    assert_eq!(table_count(&temp, "daily_summary"), 1);
}

#[tokio::test]
async fn test_reingestion_from_cache_inserts_nothing_new() {
    let temp = TempDir::new().unwrap();
    run_with(CannedSource::new(), &temp, options(day(), 1)).await.unwrap();
    let minutes_before = table_count(&temp, "sleep_minutes");

    // drop the presence marker so the day is processed again
    let conn = rusqlite::Connection::open(temp.path().join("fitbit.db")).unwrap();
    conn.execute("DELETE FROM daily_summary", []).unwrap();
    drop(conn);

    let second = CannedSource::new();
    run_with(second.clone(), &temp, options(day(), 1)).await.unwrap();

    // every payload came from the cache, every row already existed
    assert_eq!(second.fetch_count(), 0);
    assert_eq!(table_count(&temp, "sleep_minutes"), minutes_before);
    assert_eq!(table_count(&temp, "intraday_calories"), 2);
    assert_eq!(table_count(&temp, "daily_summary"), 1);
}

#[tokio::test(start_paused = true)]
async fn test_rate_limit_cools_down_and_retries_same_day() {
    let temp = TempDir::new().unwrap();
    let source = CannedSource::rate_limited_once();
    let mut opts = options(day(), 1);
    opts.cooldown = Duration::from_secs(3600);

    run_with(source.clone(), &temp, opts).await.unwrap();

    assert_eq!(source.fetch_count(), 13);
    assert_eq!(table_count(&temp, "daily_summary"), 1);
}

#[tokio::test]
async fn test_fatal_error_keeps_finished_tables() {
    let temp = TempDir::new().unwrap();
    let source = CannedSource::failing_on(RecordKind::Sleep);

    let err = run_with(source, &temp, options(day(), 1)).await.unwrap_err();
    assert!(matches!(err, FitbitError::Other(_)));

    // tables written before the failure were committed
    assert_eq!(table_count(&temp, "intraday_calories"), 2);
    assert_eq!(table_count(&temp, "body"), 1);
    // the day is not marked complete
    assert_eq!(table_count(&temp, "daily_summary"), 0);
}

#[tokio::test]
async fn test_walk_stops_at_first_date() {
    let temp = TempDir::new().unwrap();
    let mut opts = options(day(), 10);
    opts.first_date = day().pred_opt().unwrap();

    run_with(CannedSource::new(), &temp, opts).await.unwrap();

    // only the start day and the one before it are in range
    assert_eq!(table_count(&temp, "daily_summary"), 2);
}

#[tokio::test]
async fn test_offline_run_from_warm_cache() {
    let temp = TempDir::new().unwrap();
    run_with(CannedSource::new(), &temp, options(day(), 1)).await.unwrap();

    // start over with an empty database but a populated cache
    std::fs::remove_file(temp.path().join("fitbit.db")).unwrap();
    run_with(OfflineSource, &temp, options(day(), 1)).await.unwrap();

    assert_eq!(table_count(&temp, "daily_summary"), 1);
}

#[tokio::test]
async fn test_offline_cold_cache_is_fatal() {
    let temp = TempDir::new().unwrap();
    let err = run_with(OfflineSource, &temp, options(day(), 1)).await.unwrap_err();
    assert!(matches!(err, FitbitError::Offline(_)));
}
