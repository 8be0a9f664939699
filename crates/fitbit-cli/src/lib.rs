pub mod cache;
pub mod client;
pub mod config;
pub mod error;
pub mod flatten;
pub mod ingest;
pub mod model;
pub mod store;
pub mod summary;

pub use error::{FitbitError, Result};
