//! Client-level error type.
//!
//! These errors are adapter agnostic. Outbound adapters map transport and
//! response failures into this taxonomy; callers branch on [`ErrorCode`] to
//! decide between redirecting, retrying, and surfacing inline errors.

use std::fmt;

/// Stable machine-readable error code describing the failure category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum ErrorCode {
    /// No credentials are present at all.
    AuthMissing,
    /// The access token is invalid or expired and could not be refreshed.
    AuthExpired,
    /// Authenticated but not permitted to perform this action.
    Forbidden,
    /// The requested resource does not exist.
    NotFound,
    /// The request exceeded the configured client timeout.
    Timeout,
    /// The network transport failed before a response arrived.
    Transport,
    /// The request or a payload failed validation.
    Validation,
    /// An unexpected internal failure.
    Internal,
}

/// Error payload carried through the client.
///
/// ## Invariants
/// - `message` is non-empty once trimmed of whitespace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Error {
    code: ErrorCode,
    message: String,
}

impl Error {
    /// Build an error, falling back to a generic message when the provided
    /// one is blank.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        let message = message.into();
        let message = if message.trim().is_empty() {
            "unspecified error".to_owned()
        } else {
            message
        };
        Self { code, message }
    }

    /// Stable machine-readable error code.
    #[must_use]
    pub fn code(&self) -> ErrorCode {
        self.code
    }

    /// Human-readable message suitable for inline error panels.
    #[must_use]
    pub fn message(&self) -> &str {
        self.message.as_str()
    }

    /// Whether this error should end the session and navigate to login.
    #[must_use]
    pub fn is_auth(&self) -> bool {
        matches!(self.code, ErrorCode::AuthMissing | ErrorCode::AuthExpired)
    }

    /// Convenience constructor for [`ErrorCode::AuthMissing`].
    pub fn auth_missing(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::AuthMissing, message)
    }

    /// Convenience constructor for [`ErrorCode::AuthExpired`].
    pub fn auth_expired(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::AuthExpired, message)
    }

    /// Convenience constructor for [`ErrorCode::Forbidden`].
    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Forbidden, message)
    }

    /// Convenience constructor for [`ErrorCode::NotFound`].
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::NotFound, message)
    }

    /// Convenience constructor for [`ErrorCode::Timeout`].
    pub fn timeout(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Timeout, message)
    }

    /// Convenience constructor for [`ErrorCode::Transport`].
    pub fn transport(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Transport, message)
    }

    /// Convenience constructor for [`ErrorCode::Validation`].
    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Validation, message)
    }

    /// Convenience constructor for [`ErrorCode::Internal`].
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Internal, message)
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for Error {}

/// Convenient result alias used across the client.
pub type ClientResult<T> = Result<T, Error>;
