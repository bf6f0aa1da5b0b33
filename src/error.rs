// src/error.rs

//! Unified error handling for the post pipeline.

use std::fmt;

use thiserror::Error;

/// Result type alias for pipeline operations.
pub type Result<T> = std::result::Result<T, AppError>;

/// Unified application error type.
#[derive(Error, Debug)]
pub enum AppError {
    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP request failed before a response arrived
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Source did not answer within the fetch timeout
    #[error("Request to {url} timed out after {timeout_ms}ms")]
    Timeout { url: String, timeout_ms: u64 },

    /// Source answered with a non-2xx status
    #[error("HTTP status {status} from {url}")]
    HttpStatus { url: String, status: u16 },

    /// Source answered with a blank body
    #[error("Empty CSV response from {0}")]
    EmptyBody(String),

    /// CSV had no header row or no data rows
    #[error("No valid data in CSV from {0}")]
    NoRows(String),

    /// CSV reader failed
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON serialization/deserialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parsing failed
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// URL parsing failed
    #[error("URL parse error: {0}")]
    Url(#[from] url::ParseError),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Data validation error
    #[error("Validation error: {0}")]
    Validation(String),
}

impl AppError {
    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Create a timeout error for a source location.
    pub fn timeout(url: impl Into<String>, timeout_ms: u64) -> Self {
        Self::Timeout {
            url: url.into(),
            timeout_ms,
        }
    }

    /// Create a status error for a source location.
    pub fn status(url: impl Into<String>, status: u16) -> Self {
        Self::HttpStatus {
            url: url.into(),
            status,
        }
    }

    /// Whether this failure came from the transport rather than the response.
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Timeout { .. } | Self::Http(_) | Self::Io(_))
    }
}

/// A single row that could not be decoded into a post.
#[derive(Error, Debug)]
pub enum ParseError {
    /// Row could not be read or mapped onto the row schema
    #[error("row {row}: {message}")]
    Malformed { row: u64, message: String },

    /// Row decoded but carried no usable cells
    #[error("row {0}: no cells")]
    Blank(u64),
}

impl ParseError {
    /// Create a malformed-row error.
    pub fn malformed(row: u64, message: impl fmt::Display) -> Self {
        Self::Malformed {
            row,
            message: message.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timeout_is_distinct_from_status() {
        let timeout = AppError::timeout("https://example.com/a.csv", 3000);
        let status = AppError::status("https://example.com/a.csv", 404);

        assert!(timeout.is_transport());
        assert!(!status.is_transport());
        assert_eq!(
            timeout.to_string(),
            "Request to https://example.com/a.csv timed out after 3000ms"
        );
        assert_eq!(
            status.to_string(),
            "HTTP status 404 from https://example.com/a.csv"
        );
    }

    #[test]
    fn test_parse_error_display() {
        let err = ParseError::malformed(3, "invalid utf-8");
        assert_eq!(err.to_string(), "row 3: invalid utf-8");
    }
}
