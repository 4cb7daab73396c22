//! Error Types for the DCA Engine
//!
//! Pure calculators never fail; they return sentinel values instead.
//! Errors only surface from price sources, feed parsing and CSV writing.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, DcaError>;

#[derive(Error, Debug)]
pub enum DcaError {
    #[error("Price source error: {0}")]
    PriceSource(String),

    #[error("Malformed price feed: {0}")]
    MalformedFeed(String),

    #[error("Asset not supported: {0}")]
    UnsupportedAsset(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl DcaError {
    /// Check if the failed operation may succeed on retry
    pub fn is_retryable(&self) -> bool {
        matches!(self, DcaError::PriceSource(_) | DcaError::Io(_))
    }

    /// Convert to a user-friendly message
    pub fn user_message(&self) -> String {
        match self {
            DcaError::PriceSource(_) | DcaError::Io(_) => {
                "Price history is currently unavailable. Switch to manual price mode or try again.".into()
            }
            DcaError::MalformedFeed(_) => "The price history could not be read.".into(),
            DcaError::UnsupportedAsset(asset) => format!("No price history for '{}'.", asset),
            DcaError::Config(msg) => format!("Configuration error: {}", msg),
            _ => "An unexpected error occurred.".into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryable_classification() {
        assert!(DcaError::PriceSource("timeout".into()).is_retryable());
        assert!(!DcaError::MalformedFeed("bad row".into()).is_retryable());
        assert!(DcaError::UnsupportedAsset("XYZ".into()).user_message().contains("XYZ"));
    }
}
