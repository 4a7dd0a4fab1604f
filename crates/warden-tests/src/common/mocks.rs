// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Mock implementations of the capability interfaces.

use async_trait::async_trait;

use warden_core::{AuthError, AuthResult, CredentialStore, PasswordSecurer, StoredCredential};

// =============================================================================
// PlainSecurer
// =============================================================================

/// A securer that stores passwords behind a transparent marker.
///
/// Orders of magnitude faster than Argon2; for tests that exercise flows
/// rather than hashing.
#[derive(Debug, Clone)]
pub struct PlainSecurer {
    min_password_length: usize,
}

impl PlainSecurer {
    /// Creates a plain securer with the given minimum password length.
    pub fn new(min_password_length: usize) -> Self {
        Self {
            min_password_length,
        }
    }
}

impl PasswordSecurer for PlainSecurer {
    fn hash(&self, plain: &str) -> AuthResult<String> {
        if plain.is_empty() {
            return Err(AuthError::invalid_input("Password must not be empty"));
        }
        Ok(format!("plain${}", plain))
    }

    fn verify(&self, plain: &str, hash: &str) -> bool {
        hash.strip_prefix("plain$").is_some_and(|h| h == plain)
    }

    fn validate_strength(&self, plain: &str) -> bool {
        plain.chars().count() >= self.min_password_length
    }

    fn min_password_length(&self) -> usize {
        self.min_password_length
    }
}

// =============================================================================
// FailingStore
// =============================================================================

/// A credential store whose every operation fails.
///
/// Exercises the store-error paths without a real backend outage.
#[derive(Debug, Clone, Copy, Default)]
pub struct FailingStore;

#[async_trait]
impl CredentialStore for FailingStore {
    async fn fetch_by_identity(&self, _identity: &str) -> AuthResult<Option<StoredCredential>> {
        Err(AuthError::store("backend unavailable"))
    }

    async fn fetch_by_id(&self, _user_id: i64) -> AuthResult<Option<StoredCredential>> {
        Err(AuthError::store("backend unavailable"))
    }

    async fn update_password(&self, _user_id: i64, _password_hash: &str) -> AuthResult<()> {
        Err(AuthError::store("backend unavailable"))
    }
}
