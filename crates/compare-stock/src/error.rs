//! Error types for company comparison operations

use thiserror::Error;

/// Comparison specific errors
#[derive(Debug, Error)]
pub enum StockError {
    /// API request failed
    #[error("API error: {0}")]
    ApiError(String),

    /// Invalid stock symbol provided
    #[error("Invalid symbol: {0}")]
    InvalidSymbol(String),

    /// Data not available for the requested symbol
    #[error("Data not available for {symbol}: {reason}")]
    DataUnavailable {
        symbol: String,
        reason: String,
    },

    /// Rate limit exceeded for API
    #[error("Rate limit exceeded for {provider}")]
    RateLimitExceeded {
        provider: String,
    },

    /// Network or HTTP error
    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),

    /// JSON parsing error
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Filesystem error (snapshot directory, session file)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Yahoo Finance API error
    #[error("Yahoo Finance error: {0}")]
    YahooFinanceError(String),

    /// LLM call failed
    #[error("LLM error: {0}")]
    Llm(#[from] compare_llm::LLMError),

    /// No LLM provider is configured
    #[error("LLM unavailable: {0}")]
    LlmUnavailable(String),

    /// Follow-up question was blank
    #[error("Question must not be empty")]
    EmptyQuestion,

    /// Prompt template missing or failed to render
    #[error("Prompt error: {0}")]
    Prompt(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Result type alias for comparison operations
pub type Result<T> = std::result::Result<T, StockError>;

impl From<minijinja::Error> for StockError {
    fn from(err: minijinja::Error) -> Self {
        StockError::Prompt(err.to_string())
    }
}
