//! Error types for authentication and authorization operations
//!
//! This module defines the error taxonomy shared by the token codec, the
//! personal access token validator, and the invitation lifecycle engine.

use thiserror::Error;

use citygrid_access::StoreError;

/// Authentication and authorization error types.
#[derive(Debug, Error)]
pub enum AuthError {
    /// No credential, or a credential that failed verification
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Valid credential, insufficient role or scope
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Resource or invitation does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// Malformed input to an operation
    #[error("Validation failed: {0}")]
    Validation(String),

    /// Signed token has expired
    #[error("Token has expired")]
    TokenExpired,

    /// Signed token is invalid (malformed, bad signature, etc.)
    #[error("Invalid token: {0}")]
    InvalidToken(String),

    /// Rate limit exceeded
    #[error("Rate limit exceeded")]
    RateLimitExceeded,

    /// Missing or invalid configuration (e.g. unset signing secret)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Backing store failure
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type for authentication operations.
pub type AuthResult<T> = Result<T, AuthError>;

impl AuthError {
    /// Check if this error should be logged at error level.
    ///
    /// Credential failures are expected traffic; only configuration and
    /// infrastructure failures are server errors.
    pub fn is_server_error(&self) -> bool {
        matches!(
            self,
            AuthError::Config(_) | AuthError::Store(_) | AuthError::Internal(_)
        )
    }

    /// Get HTTP status code for this error.
    pub fn status_code(&self) -> u16 {
        match self {
            AuthError::Unauthorized(_) | AuthError::TokenExpired | AuthError::InvalidToken(_) => {
                401
            }
            AuthError::Forbidden(_) => 403,
            AuthError::NotFound(_) => 404,
            AuthError::Validation(_) => 400,
            AuthError::RateLimitExceeded => 429,
            AuthError::Config(_) | AuthError::Store(_) | AuthError::Internal(_) => 500,
        }
    }

    /// Get error code for API responses.
    pub fn error_code(&self) -> &'static str {
        match self {
            AuthError::Unauthorized(_) => "UNAUTHORIZED",
            AuthError::Forbidden(_) => "FORBIDDEN",
            AuthError::NotFound(_) => "NOT_FOUND",
            AuthError::Validation(_) => "VALIDATION_FAILED",
            AuthError::TokenExpired => "TOKEN_EXPIRED",
            AuthError::InvalidToken(_) => "INVALID_TOKEN",
            AuthError::RateLimitExceeded => "RATE_LIMIT_EXCEEDED",
            AuthError::Config(_) => "CONFIG_ERROR",
            AuthError::Store(_) => "STORE_ERROR",
            AuthError::Internal(_) => "INTERNAL_ERROR",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(AuthError::Unauthorized("no session".into()).status_code(), 401);
        assert_eq!(AuthError::TokenExpired.status_code(), 401);
        assert_eq!(AuthError::Forbidden("read scope only".into()).status_code(), 403);
        assert_eq!(AuthError::NotFound("invite".into()).status_code(), 404);
        assert_eq!(AuthError::Validation("bad email".into()).status_code(), 400);
        assert_eq!(AuthError::RateLimitExceeded.status_code(), 429);
        assert_eq!(AuthError::Config("secret unset".into()).status_code(), 500);
    }

    #[test]
    fn test_server_errors() {
        assert!(AuthError::Config("secret unset".into()).is_server_error());
        assert!(AuthError::Internal("oops".into()).is_server_error());
        assert!(!AuthError::Unauthorized("expired".into()).is_server_error());
        assert!(!AuthError::RateLimitExceeded.is_server_error());
    }

    #[test]
    fn test_store_error_conversion() {
        let err: AuthError = StoreError::Unavailable("connection refused".into()).into();
        assert_eq!(err.status_code(), 500);
        assert_eq!(err.error_code(), "STORE_ERROR");
    }
}
