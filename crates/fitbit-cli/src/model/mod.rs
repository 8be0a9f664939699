//! Data model shared across the pipeline
//!
//! Raw API payloads stay as `serde_json::Value` and are read through the
//! explicit path accessor in [`value`]. Flatteners turn them into [`row`]
//! batches with declared schemas and identity keys.

pub mod kind;
pub mod row;
pub mod value;

pub use kind::RecordKind;
pub use row::{Cell, Column, RowSet, SqlType, TableSchema};
