//! Error types for the remote workspace client.

use std::fmt;

/// Errors that can occur while talking to the remote service.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ClientError {
    /// The requested resource does not exist.
    #[error("resource not found: {resource}/{id}")]
    NotFound {
        /// Kind of resource (e.g. `workspace`).
        resource: String,
        /// Identifier used in the lookup.
        id: String,
    },

    /// The credentials were rejected.
    #[error("unauthorized: {message}")]
    Unauthorized { message: String },

    /// The service rejected the request payload.
    #[error("invalid request: {message}")]
    InvalidRequest { message: String },

    /// Any other non-success HTTP status.
    #[error("HTTP {status}: {message}")]
    Http { status: u16, message: String },

    /// The request never produced a response.
    #[error("transport error: {message}")]
    Transport { message: String },

    /// The response body could not be decoded.
    #[error("failed to decode response: {message}")]
    Decode { message: String },

    /// The operation context was cancelled.
    #[error("operation cancelled")]
    Cancelled,
}

impl ClientError {
    /// Creates a new `NotFound` error.
    #[must_use]
    pub fn not_found(resource: impl Into<String>, id: impl Into<String>) -> Self {
        Self::NotFound {
            resource: resource.into(),
            id: id.into(),
        }
    }

    #[must_use]
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::Unauthorized {
            message: message.into(),
        }
    }

    #[must_use]
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::InvalidRequest {
            message: message.into(),
        }
    }

    #[must_use]
    pub fn http(status: u16, message: impl Into<String>) -> Self {
        Self::Http {
            status,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
        }
    }

    #[must_use]
    pub fn decode(message: impl Into<String>) -> Self {
        Self::Decode {
            message: message.into(),
        }
    }

    /// Returns `true` if this is a not found error.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Returns `true` if the operation was cancelled.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }

    /// Returns the error category for logging purposes.
    #[must_use]
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::NotFound { .. } => ErrorCategory::NotFound,
            Self::Unauthorized { .. } => ErrorCategory::Auth,
            Self::InvalidRequest { .. } => ErrorCategory::Validation,
            Self::Http { .. } | Self::Transport { .. } => ErrorCategory::Infrastructure,
            Self::Decode { .. } => ErrorCategory::Protocol,
            Self::Cancelled => ErrorCategory::Cancelled,
        }
    }
}

/// Categories of client errors for logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    NotFound,
    Auth,
    Validation,
    Infrastructure,
    Protocol,
    Cancelled,
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound => write!(f, "not_found"),
            Self::Auth => write!(f, "auth"),
            Self::Validation => write!(f, "validation"),
            Self::Infrastructure => write!(f, "infrastructure"),
            Self::Protocol => write!(f, "protocol"),
            Self::Cancelled => write!(f, "cancelled"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ClientError::not_found("workspace", "acme/web");
        assert_eq!(err.to_string(), "resource not found: workspace/acme/web");

        let err = ClientError::http(500, "boom");
        assert_eq!(err.to_string(), "HTTP 500: boom");
    }

    #[test]
    fn test_error_predicates() {
        assert!(ClientError::not_found("workspace", "x").is_not_found());
        assert!(!ClientError::Cancelled.is_not_found());
        assert!(ClientError::Cancelled.is_cancelled());
    }

    #[test]
    fn test_error_category() {
        assert_eq!(
            ClientError::not_found("workspace", "x").category(),
            ErrorCategory::NotFound
        );
        assert_eq!(
            ClientError::unauthorized("bad token").category(),
            ErrorCategory::Auth
        );
        assert_eq!(
            ClientError::transport("reset").category(),
            ErrorCategory::Infrastructure
        );
        assert_eq!(ClientError::Cancelled.category().to_string(), "cancelled");
    }
}
