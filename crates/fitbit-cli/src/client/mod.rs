pub mod api;
pub mod tokens;

pub use api::FitbitClient;
pub use tokens::OAuth2Token;

use chrono::NaiveDate;
use serde_json::Value;

use crate::error::{FitbitError, Result};
use crate::model::RecordKind;

/// The fetch-on-cache-miss seam of the pipeline.
///
/// The driver only ever asks for a raw payload per (kind, date); everything
/// else about the vendor API stays behind this trait, which also lets tests
/// substitute canned payloads or simulated rate limits.
#[allow(async_fn_in_trait)]
pub trait VendorSource {
    async fn fetch(&mut self, kind: RecordKind, date: NaiveDate) -> Result<Value>;
}

/// Live API source
pub struct OnlineSource {
    client: FitbitClient,
    token: OAuth2Token,
}

impl OnlineSource {
    pub fn new(client: FitbitClient, token: OAuth2Token) -> Self {
        Self { client, token }
    }
}

impl VendorSource for OnlineSource {
    async fn fetch(&mut self, kind: RecordKind, date: NaiveDate) -> Result<Value> {
        self.client.fetch(&self.token, kind, date).await
    }
}

/// Offline mode: every cache miss is an error surfaced on the fatal path
pub struct OfflineSource;

impl VendorSource for OfflineSource {
    async fn fetch(&mut self, kind: RecordKind, date: NaiveDate) -> Result<Value> {
        Err(FitbitError::Offline(format!("{} on {}", kind, date)))
    }
}
