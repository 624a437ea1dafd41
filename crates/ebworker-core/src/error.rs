//! Error types for ebworker.
//!
//! This module provides the [`WorkerError`] type, which is the standard error
//! type used throughout the dispatch pipeline.
//!
//! # Error kinds
//!
//! Two kinds are raised by the dispatch shim itself and are always detected
//! before any mapped middleware runs:
//!
//! | Kind | Variant | Raised when |
//! |---|---|---|
//! | `Configuration` | [`WorkerError::MissingMapping`] | the message name has no mapping entry |
//! | `Type` | [`WorkerError::InvalidMappedType`] | the mapped value is not a string or array of strings |
//!
//! Every other kind comes from a collaborator (body decoding, resolver,
//! downstream middleware) and is forwarded to the caller as it was raised.

use http::StatusCode;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Configuration key that holds the message → middleware mapping.
pub const MESSAGES_CONFIG_KEY: &str = "messages";

/// Result type alias using [`WorkerError`].
pub type WorkerResult<T> = Result<T, WorkerError>;

/// Classification of a [`WorkerError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// No mapping exists for the dispatched message.
    Configuration,
    /// The mapped value has an unsupported shape.
    Type,
    /// A reserved delivery attribute was about to be overwritten.
    Attribute,
    /// The delivery body could not be decoded.
    Decode,
    /// A middleware identifier could not be resolved.
    Resolution,
    /// A downstream middleware failed.
    Handler,
}

impl ErrorKind {
    /// Returns the HTTP status a host should answer the queue daemon with.
    ///
    /// The daemon treats any non-2xx status as a failed delivery and makes the
    /// message visible again after the visibility timeout.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::Decode => StatusCode::BAD_REQUEST,
            Self::Configuration
            | Self::Type
            | Self::Attribute
            | Self::Resolution
            | Self::Handler => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Standard error type for ebworker.
///
/// # Example
///
/// ```
/// use ebworker_core::{ErrorKind, WorkerError};
///
/// let err = WorkerError::missing_mapping("user.registered");
/// assert_eq!(err.kind(), ErrorKind::Configuration);
/// assert!(err.to_string().contains("user.registered"));
/// ```
#[derive(Error, Debug)]
pub enum WorkerError {
    /// The message name has no entry in the mapping.
    #[error(
        "No middleware was mapped for message \"{message_name}\". Did you fill the \"{config_key}\" configuration?"
    )]
    MissingMapping {
        /// The message name that was looked up.
        message_name: String,
        /// The configuration key expected to define the mapping.
        config_key: &'static str,
    },

    /// The mapped value is neither a string nor an array of strings.
    #[error("Mapped middleware must be either a string or an array of strings, {actual} given.")]
    InvalidMappedType {
        /// The kind of value that was found (e.g. `integer`, `object`).
        actual: String,
    },

    /// A reserved dispatch attribute was about to be overwritten.
    #[error("attribute \"{name}\" is reserved for dispatch metadata and cannot be overwritten")]
    ReservedAttribute {
        /// The reserved attribute name.
        name: String,
    },

    /// The delivery body could not be decoded.
    #[error(transparent)]
    Decode(#[from] serde_json::Error),

    /// A middleware identifier is unknown to the resolver.
    #[error("middleware \"{identifier}\" could not be resolved: {reason}")]
    Unresolved {
        /// The identifier that was requested.
        identifier: String,
        /// Why resolution failed.
        reason: String,
    },

    /// A downstream middleware failed.
    #[error(transparent)]
    Handler(#[from] anyhow::Error),
}

impl WorkerError {
    /// Creates a missing mapping error for a message name.
    #[must_use]
    pub fn missing_mapping(message_name: impl Into<String>) -> Self {
        Self::MissingMapping {
            message_name: message_name.into(),
            config_key: MESSAGES_CONFIG_KEY,
        }
    }

    /// Creates an invalid mapped type error.
    #[must_use]
    pub fn invalid_mapped_type(actual: impl Into<String>) -> Self {
        Self::InvalidMappedType {
            actual: actual.into(),
        }
    }

    /// Creates a reserved attribute error.
    #[must_use]
    pub fn reserved_attribute(name: impl Into<String>) -> Self {
        Self::ReservedAttribute { name: name.into() }
    }

    /// Creates an unresolved middleware error.
    #[must_use]
    pub fn unresolved(identifier: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Unresolved {
            identifier: identifier.into(),
            reason: reason.into(),
        }
    }

    /// Wraps an arbitrary middleware failure.
    pub fn handler(source: impl Into<anyhow::Error>) -> Self {
        Self::Handler(source.into())
    }

    /// Returns the error kind.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::MissingMapping { .. } => ErrorKind::Configuration,
            Self::InvalidMappedType { .. } => ErrorKind::Type,
            Self::ReservedAttribute { .. } => ErrorKind::Attribute,
            Self::Decode(_) => ErrorKind::Decode,
            Self::Unresolved { .. } => ErrorKind::Resolution,
            Self::Handler(_) => ErrorKind::Handler,
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        self.kind().status_code()
    }
}
