use thiserror::Error;

/// Main error type for fitbit-cli
#[derive(Error, Debug)]
pub enum FitbitError {
    #[error("Not authenticated. Provide an access token via --token or FITBIT_ACCESS_TOKEN.")]
    NotAuthenticated,

    #[error("Rate limited by the Fitbit API")]
    RateLimited,

    #[error("API error {status}: {message}")]
    Api { status: u16, message: String },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Malformed payload: {0}")]
    Shape(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Cache error: {0}")]
    Cache(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid date format: {0}. Expected YYYY-MM-DD")]
    InvalidDateFormat(String),

    #[error("Offline and no cached payload for {0}")]
    Offline(String),

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, FitbitError>;

impl From<rusqlite::Error> for FitbitError {
    fn from(err: rusqlite::Error) -> Self {
        Self::Database(err.to_string())
    }
}

impl FitbitError {
    /// Create a shape error from a message
    pub fn shape(msg: impl Into<String>) -> Self {
        Self::Shape(msg.into())
    }

    /// Create a cache error from a message
    pub fn cache(msg: impl Into<String>) -> Self {
        Self::Cache(msg.into())
    }

    /// Create a database error from a message
    pub fn database(msg: impl Into<String>) -> Self {
        Self::Database(msg.into())
    }

    /// Create a configuration error from a message
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create an invalid response error from a message
    pub fn invalid_response(msg: impl Into<String>) -> Self {
        Self::InvalidResponse(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = FitbitError::shape("summary missing");
        assert_eq!(err.to_string(), "Malformed payload: summary missing");
    }

    #[test]
    fn test_rate_limited_error() {
        let err = FitbitError::RateLimited;
        assert!(err.to_string().contains("Rate limited"));
    }

    #[test]
    fn test_invalid_date_format_error() {
        let err = FitbitError::InvalidDateFormat("not-a-date".to_string());
        assert!(err.to_string().contains("not-a-date"));
        assert!(err.to_string().contains("YYYY-MM-DD"));
    }

    #[test]
    fn test_error_constructors() {
        assert!(matches!(FitbitError::shape("x"), FitbitError::Shape(_)));
        assert!(matches!(FitbitError::cache("x"), FitbitError::Cache(_)));
        assert!(matches!(FitbitError::database("x"), FitbitError::Database(_)));
        assert!(matches!(FitbitError::config("x"), FitbitError::Config(_)));
    }
}
