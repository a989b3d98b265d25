//! Error handling and custom error types
//!
//! Provides unified error handling across the application using thiserror.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Rate limit exceeded. Please try again in a moment.")]
    RateLimited,

    #[error("AI credits exhausted. Please add credits.")]
    QuotaExhausted,

    #[error("Failed to parse AI response: {0}")]
    Parse(String),

    #[error("No image generated")]
    NoImageGenerated,

    #[error("Invalid image data format: {0}")]
    InvalidImageFormat(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("AI gateway error (status {status}): {body}")]
    Upstream { status: u16, body: String },

    #[error("Request timed out after {0} seconds")]
    Timeout(u64),

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Maps a non-success upstream status onto the error taxonomy.
    pub fn from_status(status: u16, body: String) -> Self {
        match status {
            429 => Error::RateLimited,
            402 => Error::QuotaExhausted,
            _ => Error::Upstream { status, body },
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_status_maps_rate_limit_and_quota() {
        assert!(matches!(
            Error::from_status(429, String::new()),
            Error::RateLimited
        ));
        assert!(matches!(
            Error::from_status(402, String::new()),
            Error::QuotaExhausted
        ));
    }

    #[test]
    fn test_from_status_keeps_other_statuses() {
        let err = Error::from_status(503, "unavailable".to_string());
        match err {
            Error::Upstream { status, body } => {
                assert_eq!(status, 503);
                assert_eq!(body, "unavailable");
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
