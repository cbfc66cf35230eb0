//! Error types for session operations

use std::time::Duration;
use thiserror::Error;

use crate::gate::BulkAction;

/// A request parameter failed validation. Always raised before any remote call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{field} must not be empty")]
    Empty { field: String },

    #[error("{field} exceeds maximum length of {max} (got {len})")]
    TooLong {
        field: String,
        max: usize,
        len: usize,
    },

    #[error("{field} '{value}' is invalid: {expected}")]
    InvalidFormat {
        field: String,
        value: String,
        expected: &'static str,
    },

    #[error("{field} must be at least {min} (got {actual})")]
    BelowMinimum { field: String, min: i64, actual: i64 },

    #[error("{field} cannot exceed {max} (got {actual})")]
    AboveMaximum { field: String, max: i64, actual: i64 },

    #[error("unknown {field} '{value}'. Available: {allowed}")]
    Unsupported {
        field: String,
        value: String,
        allowed: String,
    },

    #[error("no fields to update. Provide {fields}")]
    NoChanges { fields: &'static str },

    #[error("invalid arguments: {0}")]
    Arguments(String),
}

impl ValidationError {
    pub fn empty(field: impl Into<String>) -> Self {
        Self::Empty {
            field: field.into(),
        }
    }

    pub fn invalid(field: impl Into<String>, value: impl Into<String>, expected: &'static str) -> Self {
        Self::InvalidFormat {
            field: field.into(),
            value: value.into(),
            expected,
        }
    }

    pub fn unsupported(field: impl Into<String>, value: impl Into<String>, allowed: &[&str]) -> Self {
        Self::Unsupported {
            field: field.into(),
            value: value.into(),
            allowed: allowed.join(", "),
        }
    }
}

/// Failure reported by the remote session API collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RemoteError {
    #[error("not found")]
    NotFound,

    #[error("unauthorized")]
    Unauthorized,

    #[error("forbidden")]
    Forbidden,

    #[error("request timed out")]
    Timeout,

    #[error("transport error: {0}")]
    Transport(String),

    #[error("HTTP {status}: {message}")]
    Api { status: u16, message: String },

    #[error("invalid response: {0}")]
    InvalidResponse(String),
}

#[derive(Debug, Error)]
pub enum AcpError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(
        "bulk {operation} limited to {limit} items. You requested {count}. Split into multiple operations."
    )]
    BulkLimitExceeded {
        operation: BulkAction,
        count: usize,
        limit: usize,
    },

    #[error("bulk {operation} requires confirm=true. Use dry_run=true to preview first.")]
    ConfirmationRequired { operation: BulkAction },

    #[error("failed to {operation} '{target}': {source}")]
    Remote {
        operation: &'static str,
        target: String,
        #[source]
        source: RemoteError,
    },

    #[error("{operation} '{target}' timed out after {}", format_limit(.limit))]
    Timeout {
        operation: &'static str,
        target: String,
        limit: Duration,
    },

    #[error("failed to encode result: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Whole seconds when exact, milliseconds otherwise.
fn format_limit(limit: &Duration) -> String {
    if limit.subsec_millis() == 0 && limit.as_secs() > 0 {
        format!("{}s", limit.as_secs())
    } else {
        format!("{}ms", limit.as_millis())
    }
}

impl AcpError {
    /// Short label for the error class, used as a prefix in tool results.
    pub fn class(&self) -> &'static str {
        match self {
            Self::Validation(_) | Self::BulkLimitExceeded { .. } | Self::ConfirmationRequired { .. } => {
                "Validation Error"
            }
            Self::Timeout { .. } => "Timeout Error",
            Self::Remote { .. } | Self::Encode(_) => "Error",
        }
    }

    /// Message attached to a single target in a bulk outcome.
    pub fn target_message(&self) -> String {
        match self {
            Self::Remote { source, .. } => source.to_string(),
            Self::Timeout { limit, .. } => format!("timed out after {}", format_limit(limit)),
            other => other.to_string(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::Remote {
                source: RemoteError::NotFound,
                ..
            }
        )
    }
}

pub type AcpResult<T> = Result<T, AcpError>;
