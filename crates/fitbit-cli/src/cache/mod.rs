//! Response cache for raw API payloads
//!
//! One JSON blob per (kind, date), partitioned by the 4-digit year of the
//! date. Entries are written durably before `put` returns, so a crash right
//! after a fetch never loses the payload. Entries are never deleted; history
//! for past days is assumed deterministic, so a key is only written once.

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use serde_json::Value;

use crate::error::{FitbitError, Result};
use crate::model::RecordKind;

/// On-disk cache keyed by (record kind, calendar date)
pub struct ResponseCache {
    dir: PathBuf,
    enabled: bool,
}

impl ResponseCache {
    /// Create a cache rooted at `dir`. With `enabled` false, `get` always
    /// misses and `put` is a no-op (the `--no-cache` toggle).
    pub fn new(dir: impl Into<PathBuf>, enabled: bool) -> Self {
        Self {
            dir: dir.into(),
            enabled,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Path of the blob for one key: `{dir}/{yyyy}/{date}_{kind}.json`
    pub fn entry_path(&self, kind: RecordKind, date: NaiveDate) -> PathBuf {
        self.dir
            .join(date.format("%Y").to_string())
            .join(format!("{}_{}.json", date.format("%Y-%m-%d"), kind.as_str()))
    }

    /// Read a cached payload. Absent entry or disabled cache yields `None`.
    /// A stored entry that fails to parse is a fatal error for the run.
    pub fn get(&self, kind: RecordKind, date: NaiveDate) -> Result<Option<Value>> {
        if !self.enabled {
            return Ok(None);
        }
        let path = self.entry_path(kind, date);
        if !path.is_file() {
            return Ok(None);
        }
        println!("Reading from cache : {}", path.display());
        let bytes = fs::read(&path)
            .map_err(|e| FitbitError::cache(format!("failed to read {}: {}", path.display(), e)))?;
        let value = serde_json::from_slice(&bytes).map_err(|e| {
            FitbitError::cache(format!("corrupt cache entry {}: {}", path.display(), e))
        })?;
        Ok(Some(value))
    }

    /// Persist a payload durably. Last write for a key wins, though the
    /// driver only ever writes a key once.
    pub fn put(&self, kind: RecordKind, date: NaiveDate, payload: &Value) -> Result<()> {
        if !self.enabled {
            return Ok(());
        }
        let path = self.entry_path(kind, date);
        if let Some(parent) = path.parent() {
            ensure_dir(parent)?;
        }
        println!("Storing to cache : {}", path.display());
        let mut file = File::create(&path)
            .map_err(|e| FitbitError::cache(format!("failed to create {}: {}", path.display(), e)))?;
        let bytes = serde_json::to_vec(payload)?;
        file.write_all(&bytes)
            .map_err(|e| FitbitError::cache(format!("failed to write {}: {}", path.display(), e)))?;
        file.sync_all()
            .map_err(|e| FitbitError::cache(format!("failed to sync {}: {}", path.display(), e)))?;
        Ok(())
    }
}

fn ensure_dir(path: &Path) -> Result<()> {
    if !path.exists() {
        fs::create_dir_all(path)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2019, 5, 12).unwrap()
    }

    #[test]
    fn test_put_then_get_round_trip() {
        let temp = TempDir::new().unwrap();
        let cache = ResponseCache::new(temp.path(), true);
        let payload = json!({"summary": {"steps": 9000}});

        cache.put(RecordKind::ActivitySummary, day(), &payload).unwrap();
        let back = cache.get(RecordKind::ActivitySummary, day()).unwrap();
        assert_eq!(back, Some(payload));
    }

    #[test]
    fn test_year_partitioned_layout() {
        let temp = TempDir::new().unwrap();
        let cache = ResponseCache::new(temp.path(), true);
        cache.put(RecordKind::Sleep, day(), &json!({})).unwrap();

        let expected = temp.path().join("2019").join("2019-05-12_sleep.json");
        assert!(expected.is_file());
    }

    #[test]
    fn test_miss_returns_none() {
        let temp = TempDir::new().unwrap();
        let cache = ResponseCache::new(temp.path(), true);
        assert!(cache.get(RecordKind::Weight, day()).unwrap().is_none());
    }

    #[test]
    fn test_disabled_cache_never_hits() {
        let temp = TempDir::new().unwrap();
        let enabled = ResponseCache::new(temp.path(), true);
        enabled.put(RecordKind::Steps, day(), &json!({"a": 1})).unwrap();

        let disabled = ResponseCache::new(temp.path(), false);
        assert!(disabled.get(RecordKind::Steps, day()).unwrap().is_none());
        // put is a no-op, existing entry untouched
        disabled.put(RecordKind::Steps, day(), &json!({"b": 2})).unwrap();
        assert_eq!(
            enabled.get(RecordKind::Steps, day()).unwrap(),
            Some(json!({"a": 1}))
        );
    }

    #[test]
    fn test_corrupt_entry_is_fatal() {
        let temp = TempDir::new().unwrap();
        let cache = ResponseCache::new(temp.path(), true);
        let path = cache.entry_path(RecordKind::Sleep, day());
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, b"{truncated").unwrap();

        let err = cache.get(RecordKind::Sleep, day()).unwrap_err();
        assert!(matches!(err, FitbitError::Cache(_)));
    }
}
