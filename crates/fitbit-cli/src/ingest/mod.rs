//! Day-by-day ingestion driver
//!
//! Walks backwards from the start date, one calendar day at a time. Each day
//! runs inside its own store transaction; a day is skipped when its daily
//! summary row already exists. A rate-limit response commits what was
//! written, cools down, and retries the same day (everything fetched before
//! the limit hit is served from the cache on retry). Any other error commits
//! and aborts the run.

use std::time::Duration;

use chrono::NaiveDate;
use serde_json::Value;

use crate::cache::ResponseCache;
use crate::client::VendorSource;
use crate::config::DataPaths;
use crate::error::{FitbitError, Result};
use crate::flatten::{activity, body, heart, intraday, sleep, steps, training};
use crate::model::{RecordKind, RowSet};
use crate::store::{export, Store};
use crate::summary;

/// Earliest day ever attempted when no `--first` override is given
pub const DEFAULT_FIRST_DATE: NaiveDate = match NaiveDate::from_ymd_opt(2010, 1, 1) {
    Some(d) => d,
    None => NaiveDate::MIN,
};

/// How long to wait after a rate-limit response before retrying
pub const DEFAULT_COOLDOWN: Duration = Duration::from_secs(3600);

#[derive(Debug, Clone)]
pub struct IngestOptions {
    /// Most recent day to process; the walk moves backwards from here
    pub start: NaiveDate,
    /// Day before which the walk stops
    pub first_date: NaiveDate,
    /// Maximum number of days visited in one run
    pub limit: u32,
    pub cooldown: Duration,
}

impl IngestOptions {
    pub fn new(start: NaiveDate) -> Self {
        Self {
            start,
            first_date: DEFAULT_FIRST_DATE,
            limit: 25,
            cooldown: DEFAULT_COOLDOWN,
        }
    }
}

pub struct Ingestor<S: VendorSource> {
    source: S,
    cache: ResponseCache,
    paths: DataPaths,
    options: IngestOptions,
}

impl<S: VendorSource> Ingestor<S> {
    pub fn new(source: S, cache: ResponseCache, paths: DataPaths, options: IngestOptions) -> Self {
        Self {
            source,
            cache,
            paths,
            options,
        }
    }

    pub async fn run(&mut self) -> Result<()> {
        let mut date = self.options.start;
        let mut visited = 0u32;
        while visited < self.options.limit {
            if date < self.options.first_date {
                println!("Reached the beginning of history ({})", self.options.first_date);
                break;
            }

            let mut store = Store::open(&self.paths.db_path())?;
            if store.is_day_complete(date) {
                store.commit()?;
                println!("{} : {} (already complete, skipping)", visited + 1, date);
            } else {
                println!("{} : {}", visited + 1, date);
                let outcome = self.process_day(&mut store, date).await;
                // finished tables for the day are kept on every path
                store.commit()?;
                match outcome {
                    Ok(()) => {}
                    Err(FitbitError::RateLimited) => {
                        println!(
                            "Rate limited; waiting {}s before retrying {}",
                            self.options.cooldown.as_secs(),
                            date
                        );
                        tokio::time::sleep(self.options.cooldown).await;
                        continue;
                    }
                    Err(err) => {
                        eprintln!("Aborting run at {} : {}", date, err);
                        return Err(err);
                    }
                }
            }

            visited += 1;
            date = match date.pred_opt() {
                Some(prev) => prev,
                None => break,
            };
        }
        Ok(())
    }

    /// Fetch, flatten and store every record kind for one day
    async fn process_day(&mut self, store: &mut Store, date: NaiveDate) -> Result<()> {
        for kind in RecordKind::INTRADAY_GROUP {
            let payload = self.cached_or_fetch(kind, date).await?;
            if intraday::is_flattened(kind) {
                let mut batch = intraday::flatten(kind, &payload, date)?;
                self.save(store, &mut batch, date)?;
            }
        }

        let weight = self.cached_or_fetch(RecordKind::Weight, date).await?;
        let fat = self.cached_or_fetch(RecordKind::BodyFat, date).await?;
        let mut body_rows = body::flatten(&weight, &fat, date)?;
        self.save(store, &mut body_rows, date)?;

        let sleep_payload = self.cached_or_fetch(RecordKind::Sleep, date).await?;
        for mut batch in sleep::flatten(&sleep_payload, date)? {
            self.save(store, &mut batch, date)?;
        }

        let activity_payload = self.cached_or_fetch(RecordKind::ActivitySummary, date).await?;
        for mut batch in activity::flatten(&activity_payload, date)? {
            self.save(store, &mut batch, date)?;
        }

        let steps_payload = self.cached_or_fetch(RecordKind::Steps, date).await?;
        for mut batch in steps::flatten(&steps_payload, date)? {
            self.save(store, &mut batch, date)?;
        }

        let heart_payload = self.cached_or_fetch(RecordKind::HeartRate, date).await?;
        for mut batch in heart::flatten(&heart_payload, date)? {
            self.save(store, &mut batch, date)?;
        }

        let training_payload = self.cached_or_fetch(RecordKind::TrainingLog, date).await?;
        let mut training_rows = training::flatten(&training_payload, date)?;
        self.save(store, &mut training_rows, date)?;

        // written last: its presence marks the whole day as done
        if let Some(mut row) = summary::compose(
            Some(&activity_payload),
            Some(&sleep_payload),
            Some(&heart_payload),
            date,
        ) {
            self.save(store, &mut row, date)?;
        }
        Ok(())
    }

    /// Cache hit, or fetch from the source and persist before returning
    async fn cached_or_fetch(&mut self, kind: RecordKind, date: NaiveDate) -> Result<Value> {
        if let Some(hit) = self.cache.get(kind, date)? {
            return Ok(hit);
        }
        let payload = self.source.fetch(kind, date).await?;
        self.cache.put(kind, date, &payload)?;
        Ok(payload)
    }

    fn save(&self, store: &mut Store, batch: &mut RowSet, date: NaiveDate) -> Result<()> {
        batch.dedup_keep_last();
        store.write(batch)?;
        export::write_snapshot(&self.paths.export_dir(), batch, date)?;
        Ok(())
    }
}
