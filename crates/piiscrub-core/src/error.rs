//! Error types for policy and configuration construction.
//!
//! Redaction, detection and masking are infallible; errors only arise while
//! building a policy from user-supplied rules.

use thiserror::Error;

/// Convenience alias for fallible piiscrub operations
pub type Result<T> = std::result::Result<T, SanitizeError>;

#[derive(Debug, Error)]
pub enum SanitizeError {
    /// A content pattern failed to compile
    #[error("invalid pattern '{name}': {source}")]
    InvalidPattern {
        name: String,
        #[source]
        source: regex::Error,
    },

    /// A category label did not match any known PII category
    #[error("unknown PII category: {0}")]
    UnknownCategory(String),

    /// Configuration was well-formed TOML but semantically invalid
    #[error("configuration error: {0}")]
    Config(String),

    #[error("failed to parse configuration: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
