// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Error types for netlogger
//!
//! Transport errors are the only ones handed back to application code.
//! Everything raised inside the logging pipeline is logged and swallowed at
//! the pipeline boundary, but still typed here so it can be reported.

use thiserror::Error;

/// Result type alias for netlogger operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for netlogger
#[derive(Error, Debug)]
pub enum Error {
    /// HTTP request failed
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// URL parsing failed
    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Record could not be converted to the payload a sink requires
    #[error("Encoding failed at depth {depth}: {reason}")]
    Encode { reason: String, depth: usize },

    /// Filter expression could not be parsed
    #[error("Invalid filter expression at {position}: {reason}")]
    FilterParse {
        expression: String,
        position: usize,
        reason: String,
    },

    /// Filter expression failed while evaluating against a record
    #[error("Filter evaluation error: {0}")]
    FilterEval(String),

    /// User obfuscation handler failed
    #[error("Obfuscation handler failed: {0}")]
    Obfuscation(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create an encoding error
    pub fn encode(reason: impl Into<String>, depth: usize) -> Self {
        Error::Encode {
            reason: reason.into(),
            depth,
        }
    }

    /// Create a filter parse error
    pub fn filter_parse(
        expression: impl Into<String>,
        position: usize,
        reason: impl Into<String>,
    ) -> Self {
        Error::FilterParse {
            expression: expression.into(),
            position,
            reason: reason.into(),
        }
    }

    /// Create a filter evaluation error
    pub fn filter_eval<S: Into<String>>(msg: S) -> Self {
        Error::FilterEval(msg.into())
    }

    /// Create an obfuscation error
    pub fn obfuscation<S: Into<String>>(msg: S) -> Self {
        Error::Obfuscation(msg.into())
    }

    /// Create a configuration error
    pub fn config<S: Into<String>>(msg: S) -> Self {
        Error::Config(msg.into())
    }

    /// Create a generic error
    pub fn other<S: Into<String>>(msg: S) -> Self {
        Error::Other(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_parse_display() {
        let err = Error::filter_parse("network.url ===", 15, "unexpected end of input");
        assert_eq!(
            err.to_string(),
            "Invalid filter expression at 15: unexpected end of input"
        );
    }

    #[test]
    fn test_pipeline_error_display() {
        assert_eq!(
            Error::encode("nested too deeply", 129).to_string(),
            "Encoding failed at depth 129: nested too deeply"
        );
        assert_eq!(
            Error::obfuscation("handler returned garbage").to_string(),
            "Obfuscation handler failed: handler returned garbage"
        );

        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing.json");
        assert!(matches!(Error::from(io), Error::Io(_)));
    }
}
