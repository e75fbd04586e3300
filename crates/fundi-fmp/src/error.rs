//! Error types for the FMP API client.

use fundi_traits::FundiError;
use thiserror::Error;

/// Errors that can occur when using the FMP API.
#[derive(Debug, Error)]
pub enum FmpError {
    /// Missing API key.
    #[error("FMP_API_KEY environment variable not set")]
    MissingApiKey,

    /// HTTP request failed.
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// JSON parsing failed.
    #[error("Failed to parse JSON response: {0}")]
    Json(#[from] serde_json::Error),

    /// API returned an error.
    #[error("FMP API error: {0}")]
    Api(String),

    /// Rate limit exceeded.
    #[error("Rate limit exceeded. Free tier allows 250 requests/day.")]
    RateLimitExceeded,

    /// Symbol not found.
    #[error("Symbol not found: {0}")]
    SymbolNotFound(String),

    /// No data available.
    #[error("No data available for {0}")]
    NoData(String),

    /// Environment variable error.
    #[error("Environment error: {0}")]
    Env(#[from] dotenvy::Error),
}

impl From<FmpError> for FundiError {
    fn from(err: FmpError) -> Self {
        match err {
            FmpError::MissingApiKey | FmpError::Env(_) => Self::Config(err.to_string()),
            FmpError::RateLimitExceeded => Self::RateLimited(err.to_string()),
            FmpError::SymbolNotFound(_) | FmpError::NoData(_) => Self::NotFound(err.to_string()),
            FmpError::Request(ref e) if e.is_timeout() || e.is_connect() || e.is_request() => {
                Self::Network(err.to_string())
            }
            FmpError::Request(_) | FmpError::Json(_) | FmpError::Api(_) => {
                Self::DataFetch(err.to_string())
            }
        }
    }
}
