//! Lexaid Common Error Types
//!
//! Centralized error handling for all Lexaid components. The variants map
//! onto the outcomes a front-end has to tell apart: stopped by the user,
//! rate limited, and a plain failure.

use thiserror::Error;

/// Main error type for Lexaid operations
#[derive(Debug, Error)]
pub enum LexError {
    /// Missing or invalid configuration, e.g. no API keys
    #[error("Configuration error: {0}")]
    Config(String),

    /// Every configured key hit its rate limit during one call
    #[error("All {attempts} API keys are rate limited. Please wait a minute and retry.")]
    CredentialsExhausted { attempts: usize },

    /// The caller triggered the cancellation signal
    #[error("Operation cancelled by user")]
    Cancelled,

    /// Any other provider failure, message passed through as-is
    #[error("Provider error: {0}")]
    Provider(String),

    /// Catalog building or loading errors
    #[error("Catalog error: {0}")]
    Catalog(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Config parse error: {0}")]
    Toml(#[from] toml::de::Error),
}

impl LexError {
    /// True when the user stopped the operation
    pub fn is_cancelled(&self) -> bool {
        matches!(self, LexError::Cancelled)
    }

    /// True when the key pool ran dry on rate limits
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, LexError::CredentialsExhausted { .. })
    }
}

/// Convenience result type for Lexaid operations
pub type Result<T> = std::result::Result<T, LexError>;

impl From<anyhow::Error> for LexError {
    fn from(err: anyhow::Error) -> Self {
        LexError::Provider(err.to_string())
    }
}
