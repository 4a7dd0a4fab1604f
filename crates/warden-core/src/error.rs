// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Unified error hierarchy for Warden.
//!
//! This module defines the authentication/authorization error taxonomy used
//! across the core:
//!
//! - Typed failures for every way a credential or token can be rejected
//! - A hard split between user-facing and log-facing messages
//! - HTTP status code mapping for the API layer
//!
//! `InvalidCredentials` carries no detail on purpose: callers must not be able
//! to tell whether the identity or the password was wrong.

use thiserror::Error;

/// Result type alias for core authentication operations.
pub type AuthResult<T> = Result<T, AuthError>;

// =============================================================================
// AuthError
// =============================================================================

/// The root error type for authentication and authorization.
///
/// All failures in this core are per-call and recoverable by the caller
/// (retry login, refresh the token, request elevated access). Nothing here is
/// fatal to the process.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Malformed request data, e.g. an empty password.
    #[error("Invalid input: {message}")]
    InvalidInput {
        /// What was wrong with the input.
        message: String,
    },

    /// Wrong identity or password. Deliberately does not say which.
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// Token material that does not parse as a token at all.
    #[error("Malformed token")]
    MalformedToken,

    /// Token signature does not verify against the configured key/algorithm.
    ///
    /// Also covers tokens signed with a different algorithm than the one
    /// configured, and tokens from a different issuer.
    #[error("Invalid token signature")]
    SignatureInvalid,

    /// Token expiry has elapsed.
    #[error("Token expired")]
    Expired,

    /// Authenticated but not authorized for the requested operation.
    #[error("Forbidden")]
    Forbidden,

    /// Credential store failure.
    #[error("Credential store error: {message}")]
    Store {
        /// Error message (for logging, not user-facing).
        message: String,
    },

    /// Internal fault (hashing backend, token encoding).
    #[error("Internal error: {message}")]
    Internal {
        /// Error message (for logging, not user-facing).
        message: String,
    },
}

impl AuthError {
    // =========================================================================
    // Constructors
    // =========================================================================

    /// Creates an invalid input error.
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
        }
    }

    /// Creates a store error.
    pub fn store(message: impl Into<String>) -> Self {
        Self::Store {
            message: message.into(),
        }
    }

    /// Creates an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    // =========================================================================
    // Properties
    // =========================================================================

    /// Returns `true` if this is an authentication failure.
    ///
    /// The API layer collapses every authentication failure into a single
    /// uniform "unauthenticated" response so the specific sub-reason never
    /// reaches the caller.
    pub fn is_authentication(&self) -> bool {
        matches!(
            self,
            AuthError::InvalidCredentials
                | AuthError::MalformedToken
                | AuthError::SignatureInvalid
                | AuthError::Expired
        )
    }

    /// Returns the error code for categorization in logs and metrics.
    pub fn error_code(&self) -> &'static str {
        match self {
            AuthError::InvalidInput { .. } => "INVALID_INPUT",
            AuthError::InvalidCredentials => "INVALID_CREDENTIALS",
            AuthError::MalformedToken => "MALFORMED_TOKEN",
            AuthError::SignatureInvalid => "SIGNATURE_INVALID",
            AuthError::Expired => "EXPIRED",
            AuthError::Forbidden => "FORBIDDEN",
            AuthError::Store { .. } => "STORE_ERROR",
            AuthError::Internal { .. } => "INTERNAL_ERROR",
        }
    }

    /// Returns the HTTP status code for this error.
    pub fn status_code(&self) -> u16 {
        match self {
            AuthError::InvalidInput { .. } => 422,
            AuthError::InvalidCredentials
            | AuthError::MalformedToken
            | AuthError::SignatureInvalid
            | AuthError::Expired => 401,
            AuthError::Forbidden => 403,
            AuthError::Store { .. } | AuthError::Internal { .. } => 500,
        }
    }

    /// Returns a user-friendly error message.
    ///
    /// Authentication failures all render the same message; the precise
    /// reason is available to operators via logs only.
    pub fn user_message(&self) -> String {
        match self {
            AuthError::InvalidInput { message } => message.clone(),
            e if e.is_authentication() => "Authentication required".to_string(),
            AuthError::Forbidden => "Access denied".to_string(),
            _ => "Internal server error".to_string(),
        }
    }

    /// Returns `true` if this error should be recorded in the audit log.
    pub fn should_audit(&self) -> bool {
        matches!(
            self,
            AuthError::InvalidCredentials
                | AuthError::SignatureInvalid
                | AuthError::Expired
                | AuthError::Forbidden
        )
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(AuthError::invalid_input("empty password").status_code(), 422);
        assert_eq!(AuthError::InvalidCredentials.status_code(), 401);
        assert_eq!(AuthError::MalformedToken.status_code(), 401);
        assert_eq!(AuthError::SignatureInvalid.status_code(), 401);
        assert_eq!(AuthError::Expired.status_code(), 401);
        assert_eq!(AuthError::Forbidden.status_code(), 403);
        assert_eq!(AuthError::store("down").status_code(), 500);
    }

    #[test]
    fn test_authentication_failures_share_user_message() {
        let reasons = [
            AuthError::InvalidCredentials,
            AuthError::MalformedToken,
            AuthError::SignatureInvalid,
            AuthError::Expired,
        ];
        for reason in &reasons {
            assert!(reason.is_authentication());
            assert_eq!(reason.user_message(), "Authentication required");
        }
    }

    #[test]
    fn test_forbidden_is_distinct_from_unauthenticated() {
        assert!(!AuthError::Forbidden.is_authentication());
        assert_ne!(
            AuthError::Forbidden.user_message(),
            AuthError::InvalidCredentials.user_message()
        );
    }

    #[test]
    fn test_should_audit() {
        assert!(AuthError::InvalidCredentials.should_audit());
        assert!(AuthError::Forbidden.should_audit());
        assert!(!AuthError::invalid_input("x").should_audit());
        assert!(!AuthError::MalformedToken.should_audit());
    }
}
