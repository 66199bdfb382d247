//! Error types for the sudoku API client.
//!
//! # Design
//! One enum, one variant per failure kind, each carrying only the fields a
//! caller needs to render a message without re-parsing strings. `kind()`
//! gives a flat discriminant for callers that only want to branch.
//! Validation failures live in their own enum because they are produced by
//! pure functions that never see a response.

use std::fmt;

use serde_json::Value;
use thiserror::Error;

use crate::http::TransportError;

/// Input rejected before any request was built.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{field} is required")]
    Required { field: &'static str },

    #[error("{field} has invalid format: {value:?} (expected {expected})")]
    InvalidFormat {
        field: &'static str,
        value: String,
        expected: &'static str,
    },

    #[error("{field} must be between {min} and {max}, got {value}")]
    OutOfRange {
        field: &'static str,
        value: i64,
        min: i64,
        max: i64,
    },

    #[error("{field} must be {min} to {max} characters long, got {length}")]
    InvalidLength {
        field: &'static str,
        length: usize,
        min: usize,
        max: usize,
    },
}

impl ValidationError {
    pub fn field(&self) -> &'static str {
        match self {
            ValidationError::Required { field }
            | ValidationError::InvalidFormat { field, .. }
            | ValidationError::OutOfRange { field, .. }
            | ValidationError::InvalidLength { field, .. } => field,
        }
    }
}

/// Paywall details attached to a 402 from the solve endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessDenied {
    /// Backend error code that triggered this branch.
    pub code: String,
    pub message: String,
    /// Entitlement needed for the requested hint level.
    pub required_entitlement: String,
    /// The caller's entitlement, `None` for free users.
    pub current_entitlement: Option<String>,
    /// Hint level the caller asked for.
    pub hint_level: Option<String>,
}

impl fmt::Display for AccessDenied {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "access denied: {} requires {}",
            self.hint_level.as_deref().unwrap_or("this hint level"),
            self.required_entitlement
        )
    }
}

/// Every way a façade call can fail.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("invalid input: {0}")]
    Validation(#[from] ValidationError),

    /// The transport itself failed; the source error is kept as-is.
    #[error("transport error: {0}")]
    Transport(#[source] TransportError),

    /// A response arrived without a payload.
    #[error("no data received (HTTP {status})")]
    NoData { status: u16 },

    /// The server returned a non-2xx status.
    #[error("HTTP {status}: {message}")]
    Api {
        status: u16,
        message: String,
        body: Option<Value>,
    },

    #[error("{0}")]
    AccessDenied(AccessDenied),

    /// The request payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    Serialization(String),

    /// The response payload did not match the expected type.
    #[error("deserialization failed (HTTP {status}): {message}")]
    Deserialization { status: u16, message: String },
}

/// Flat discriminant over `ApiError`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Validation,
    Transport,
    NoData,
    Api,
    AccessDenied,
    Serialization,
    Deserialization,
}

impl ApiError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ApiError::Validation(_) => ErrorKind::Validation,
            ApiError::Transport(_) => ErrorKind::Transport,
            ApiError::NoData { .. } => ErrorKind::NoData,
            ApiError::Api { .. } => ErrorKind::Api,
            ApiError::AccessDenied(_) => ErrorKind::AccessDenied,
            ApiError::Serialization(_) => ErrorKind::Serialization,
            ApiError::Deserialization { .. } => ErrorKind::Deserialization,
        }
    }

    /// HTTP status when the failure came from a response.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::NoData { status }
            | ApiError::Api { status, .. }
            | ApiError::Deserialization { status, .. } => Some(*status),
            ApiError::AccessDenied(_) => Some(402),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }

    pub fn is_unauthorized(&self) -> bool {
        matches!(self.status(), Some(401) | Some(403))
    }

    pub fn as_validation(&self) -> Option<&ValidationError> {
        match self {
            ApiError::Validation(e) => Some(e),
            _ => None,
        }
    }

    pub fn as_access_denied(&self) -> Option<&AccessDenied> {
        match self {
            ApiError::AccessDenied(d) => Some(d),
            _ => None,
        }
    }
}
