//! Data directory layout
//!
//! Everything the tool writes lives under one root:
//!
//! ```text
//! ~/.local/share/fitbit/
//! ├── fitbit.db       # SQLite store, one table per record kind
//! ├── cache/
//! │   └── 2019/       # year-partitioned raw payloads
//! └── exports/
//!     └── <table>/    # per-(table, date) CSV snapshots
//! ```

use std::path::{Path, PathBuf};

use crate::error::{FitbitError, Result};

/// Default data directory name
const DATA_DIR_NAME: &str = "fitbit";

/// Get the default data root
/// Returns ~/.local/share/fitbit on Unix, ~/Library/Application Support/fitbit on macOS
pub fn default_data_dir() -> Result<PathBuf> {
    dirs::data_local_dir()
        .map(|p| p.join(DATA_DIR_NAME))
        .ok_or_else(|| FitbitError::config("Could not determine data directory"))
}

/// Resolved locations of the store, cache and exports
#[derive(Debug, Clone)]
pub struct DataPaths {
    base: PathBuf,
}

impl DataPaths {
    pub fn new(base: impl Into<PathBuf>) -> Self {
        Self { base: base.into() }
    }

    pub fn base(&self) -> &Path {
        &self.base
    }

    pub fn db_path(&self) -> PathBuf {
        self.base.join("fitbit.db")
    }

    pub fn cache_dir(&self) -> PathBuf {
        self.base.join("cache")
    }

    pub fn export_dir(&self) -> PathBuf {
        self.base.join("exports")
    }

    /// Create the directory tree up front
    pub fn ensure(&self) -> Result<()> {
        for dir in [&self.base, &self.cache_dir(), &self.export_dir()] {
            if !dir.exists() {
                std::fs::create_dir_all(dir)?;
            }
        }
        Ok(())
    }
}
