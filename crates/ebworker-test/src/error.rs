//! Test error types.

use std::fmt;

/// Errors that can occur while building test fixtures.
#[derive(Debug)]
pub enum TestError {
    /// Delivery building failed
    DeliveryBuild(String),
    /// Header name or value is invalid
    InvalidHeader(String),
    /// JSON serialization failed
    Json(serde_json::Error),
}

impl fmt::Display for TestError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DeliveryBuild(msg) => write!(f, "Delivery build error: {msg}"),
            Self::InvalidHeader(msg) => write!(f, "Invalid header: {msg}"),
            Self::Json(e) => write!(f, "JSON error: {e}"),
        }
    }
}

impl std::error::Error for TestError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Json(e) => Some(e),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for TestError {
    fn from(e: serde_json::Error) -> Self {
        Self::Json(e)
    }
}
