//! Fitbit Web API client for authenticated requests
//!
//! Thin plumbing: builds per-kind request paths, attaches the OAuth2 bearer
//! token and maps HTTP status codes onto the error taxonomy. The one status
//! the pipeline cares about is 429, which becomes the distinguished
//! `RateLimited` error.

use chrono::{Days, NaiveDate};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;

use crate::client::tokens::OAuth2Token;
use crate::error::{FitbitError, Result};
use crate::model::RecordKind;

/// Default API host
const API_BASE_URL: &str = "https://api.fitbit.com";

/// Window size of the activity-list endpoint (vendor returns this many
/// recent activities regardless of the requested date)
const TRAINING_LOG_WINDOW: u32 = 20;

/// Fitbit Web API client
pub struct FitbitClient {
    client: Client,
    base_url: String,
}

impl Default for FitbitClient {
    fn default() -> Self {
        Self::new()
    }
}

impl FitbitClient {
    pub fn new() -> Self {
        Self::new_with_base_url(API_BASE_URL)
    }

    /// Create a client with a custom base URL (for testing)
    pub fn new_with_base_url(base_url: &str) -> Self {
        Self {
            client: Client::builder()
                .timeout(std::time::Duration::from_secs(30))
                .build()
                .unwrap_or_default(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Request path for one (kind, date)
    pub fn path_for(kind: RecordKind, date: NaiveDate) -> String {
        let day = date.format("%Y-%m-%d");
        if let Some(resource) = kind.intraday_resource() {
            return format!("/1/user/-/activities/{}/date/{}/1d/1min.json", resource, day);
        }
        match kind {
            RecordKind::ActivitySummary => format!("/1/user/-/activities/date/{}.json", day),
            RecordKind::Sleep => format!("/1/user/-/sleep/date/{}.json", day),
            RecordKind::Weight => format!("/1/user/-/body/log/weight/date/{}/1d.json", day),
            RecordKind::BodyFat => format!("/1/user/-/body/log/fat/date/{}/1d.json", day),
            RecordKind::TrainingLog => {
                // beforeDate is exclusive, so ask from the following day
                let before = date.checked_add_days(Days::new(1)).unwrap_or(date);
                format!(
                    "/1/user/-/activities/list.json?beforeDate={}&sort=desc&limit={}&offset=0",
                    before.format("%Y-%m-%d"),
                    TRAINING_LOG_WINDOW
                )
            }
            _ => unreachable!("intraday kinds handled above"),
        }
    }

    /// Fetch the raw payload for one (kind, date)
    pub async fn fetch(
        &self,
        token: &OAuth2Token,
        kind: RecordKind,
        date: NaiveDate,
    ) -> Result<serde_json::Value> {
        self.get_json(token, &Self::path_for(kind, date)).await
    }

    /// Make an authenticated GET request and deserialize the JSON response
    pub async fn get_json<T: DeserializeOwned>(&self, token: &OAuth2Token, path: &str) -> Result<T> {
        let response = self.get(token, path).await?;
        response.json().await.map_err(|e| {
            FitbitError::invalid_response(format!("Failed to parse JSON response: {}", e))
        })
    }

    /// Make an authenticated GET request and return the response
    pub async fn get(&self, token: &OAuth2Token, path: &str) -> Result<Response> {
        let url = format!("{}{}", self.base_url, path);
        let headers = self.build_headers(token)?;

        let response = self
            .client
            .get(&url)
            .headers(headers)
            .send()
            .await
            .map_err(FitbitError::Http)?;

        self.handle_response_status(response).await
    }

    fn build_headers(&self, token: &OAuth2Token) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        let auth = HeaderValue::from_str(&token.authorization_header())
            .map_err(|e| FitbitError::config(format!("invalid access token: {}", e)))?;
        headers.insert(AUTHORIZATION, auth);
        Ok(headers)
    }

    /// Handle response status codes and convert to errors
    async fn handle_response_status(&self, response: Response) -> Result<Response> {
        let status = response.status();

        match status {
            StatusCode::OK | StatusCode::CREATED | StatusCode::NO_CONTENT => Ok(response),
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(FitbitError::NotAuthenticated),
            StatusCode::TOO_MANY_REQUESTS => Err(FitbitError::RateLimited),
            _ => {
                let body = response.text().await.unwrap_or_default();
                Err(FitbitError::Api {
                    status: status.as_u16(),
                    message: body,
                })
            }
        }
    }
}
