//! Error types for the fundi engine.
//!
//! Absent or unparsable numeric data is never an error anywhere in fundi. Only
//! structural problems (a payload that is not a record at all), configuration
//! mistakes (a rule that cannot be evaluated) and provider failures surface here.

use thiserror::Error;

/// The main error type for fundi operations.
#[derive(Debug, Error)]
pub enum FundiError {
    /// The provider payload is not a well-formed record (null, scalar or list).
    #[error("Malformed record: {0}")]
    MalformedRecord(String),

    /// A screening rule is invalid (unknown or non-numeric metric, bad threshold).
    #[error("Invalid rule: {0}")]
    InvalidRule(String),

    /// The provider does not know the requested ticker or sector.
    #[error("Symbol not found: {0}")]
    NotFound(String),

    /// The provider rejected the request because of rate limiting.
    #[error("Rate limit exceeded: {0}")]
    RateLimited(String),

    /// Transport-level failure talking to the provider.
    #[error("Network error: {0}")]
    Network(String),

    /// Any other provider-side failure (bad response, API error).
    #[error("Data fetch error: {0}")]
    DataFetch(String),

    /// Invalid configuration outside of a single rule.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Error from Polars operations.
    #[error("Polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    /// Generic error for other cases.
    #[error("Error: {0}")]
    Other(String),
}

impl FundiError {
    /// Whether a single retry may succeed.
    ///
    /// Only network failures are transient. Rate limits are not retried, the
    /// provider already told us to back off.
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        matches!(self, Self::Network(_))
    }

    /// Whether the error is scoped to one ticker and must not abort a sector scan.
    #[must_use]
    pub const fn is_per_ticker(&self) -> bool {
        matches!(
            self,
            Self::MalformedRecord(_)
                | Self::NotFound(_)
                | Self::RateLimited(_)
                | Self::Network(_)
                | Self::DataFetch(_)
        )
    }
}

impl From<String> for FundiError {
    fn from(s: String) -> Self {
        Self::Other(s)
    }
}

impl From<&str> for FundiError {
    fn from(s: &str) -> Self {
        Self::Other(s.to_string())
    }
}

/// A specialized Result type for fundi operations.
pub type Result<T> = std::result::Result<T, FundiError>;
