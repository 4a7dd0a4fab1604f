// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Password hashing and strength validation.
//!
//! Hashing uses Argon2id with a fresh random salt per hash. Verification is
//! oracle-free: a malformed or truncated stored hash verifies as `false`, it
//! never surfaces an error the caller could distinguish from a wrong
//! password.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};

use crate::error::{AuthError, AuthResult};

/// Default minimum password length.
pub const DEFAULT_MIN_PASSWORD_LENGTH: usize = 8;

// =============================================================================
// PasswordSecurer
// =============================================================================

/// Capability interface for credential security.
///
/// Resource services and the auth service depend on this trait rather than a
/// concrete hasher, so tests can substitute a fake (e.g. an identity hasher)
/// without paying the Argon2 cost.
pub trait PasswordSecurer: Send + Sync {
    /// Hashes a plaintext password into a PHC-format string.
    ///
    /// Fails with `InvalidInput` on an empty password.
    fn hash(&self, plain: &str) -> AuthResult<String>;

    /// Verifies a plaintext password against a stored hash.
    ///
    /// Returns `false` on any mismatch, including a malformed stored hash.
    fn verify(&self, plain: &str, hash: &str) -> bool;

    /// Checks the password against the strength policy.
    ///
    /// A weak password is a business-rule violation, not a fault, so this
    /// returns `false` rather than an error.
    fn validate_strength(&self, plain: &str) -> bool;

    /// Returns the configured minimum password length.
    fn min_password_length(&self) -> usize;
}

// =============================================================================
// Argon2Securer
// =============================================================================

/// Argon2id-backed implementation of [`PasswordSecurer`].
///
/// Stateless apart from the strength policy; safe to share across concurrent
/// call handlers. Hashing is deliberately slow.
#[derive(Debug, Clone)]
pub struct Argon2Securer {
    min_password_length: usize,
}

impl Argon2Securer {
    /// Creates a securer with the given minimum password length.
    pub fn new(min_password_length: usize) -> Self {
        Self {
            min_password_length,
        }
    }
}

impl Default for Argon2Securer {
    fn default() -> Self {
        Self::new(DEFAULT_MIN_PASSWORD_LENGTH)
    }
}

impl PasswordSecurer for Argon2Securer {
    fn hash(&self, plain: &str) -> AuthResult<String> {
        if plain.is_empty() {
            return Err(AuthError::invalid_input("Password must not be empty"));
        }

        let salt = SaltString::generate(&mut OsRng);
        let hash = Argon2::default()
            .hash_password(plain.as_bytes(), &salt)
            .map_err(|e| AuthError::internal(format!("Password hashing failed: {}", e)))?;

        Ok(hash.to_string())
    }

    fn verify(&self, plain: &str, hash: &str) -> bool {
        let Ok(parsed) = PasswordHash::new(hash) else {
            return false;
        };

        Argon2::default()
            .verify_password(plain.as_bytes(), &parsed)
            .is_ok()
    }

    fn validate_strength(&self, plain: &str) -> bool {
        plain.chars().count() >= self.min_password_length
    }

    fn min_password_length(&self) -> usize {
        self.min_password_length
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn securer() -> Argon2Securer {
        Argon2Securer::new(8)
    }

    #[test]
    fn test_hash_and_verify_round_trip() {
        let sec = securer();
        let hash = sec.hash("hunter2hunter2").unwrap();

        assert!(hash.starts_with("$argon2"));
        assert!(sec.verify("hunter2hunter2", &hash));
    }

    #[test]
    fn test_verify_rejects_wrong_password() {
        let sec = securer();
        let hash = sec.hash("correct-horse").unwrap();

        assert!(!sec.verify("battery-staple", &hash));
    }

    #[test]
    fn test_hashes_are_salted() {
        let sec = securer();
        let first = sec.hash("same-password").unwrap();
        let second = sec.hash("same-password").unwrap();

        assert_ne!(first, second);
        assert!(sec.verify("same-password", &first));
        assert!(sec.verify("same-password", &second));
    }

    #[test]
    fn test_empty_password_rejected() {
        let sec = securer();
        let result = sec.hash("");

        assert!(matches!(result, Err(AuthError::InvalidInput { .. })));
    }

    #[test]
    fn test_malformed_hash_verifies_false() {
        let sec = securer();

        assert!(!sec.verify("anything", "not-a-phc-string"));
        assert!(!sec.verify("anything", ""));
        assert!(!sec.verify("anything", "$argon2id$truncated"));
    }

    #[test]
    fn test_strength_boundary() {
        let sec = securer();

        assert!(!sec.validate_strength("1234567"));
        assert!(sec.validate_strength("12345678"));
        assert!(sec.validate_strength("123456789"));
    }
}
