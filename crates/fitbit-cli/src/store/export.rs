//! Per-day CSV snapshots
//!
//! Next to every database write, the batch is also dropped as a flat file
//! under `exports/<table>/<table>_<yyyymmdd>.csv`. Reprocessing a day
//! overwrites its snapshot, so the file always reflects the latest run.

use std::path::{Path, PathBuf};

use chrono::NaiveDate;

use crate::error::Result;
use crate::model::RowSet;

/// Snapshot location for one (table, date) pair
pub fn snapshot_path(export_dir: &Path, table: &str, date: NaiveDate) -> PathBuf {
    export_dir
        .join(table)
        .join(format!("{}_{}.csv", table, date.format("%Y%m%d")))
}

/// Write the batch as a CSV snapshot, header included
pub fn write_snapshot(export_dir: &Path, batch: &RowSet, date: NaiveDate) -> Result<()> {
    let path = snapshot_path(export_dir, batch.schema.table, date);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let mut writer = csv::Writer::from_path(&path).map_err(csv_io)?;
    let header: Vec<&str> = batch.schema.columns.iter().map(|c| c.name).collect();
    writer.write_record(&header).map_err(csv_io)?;
    for row in &batch.rows {
        let fields: Vec<String> = row.iter().map(|c| c.to_csv_field()).collect();
        writer.write_record(&fields).map_err(csv_io)?;
    }
    writer.flush()?;
    Ok(())
}

fn csv_io(err: csv::Error) -> crate::error::FitbitError {
    crate::error::FitbitError::Other(format!("CSV export error: {}", err))
}
