// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Credential storage interface.
//!
//! The core never talks to a database. User records live with an external
//! storage collaborator reached through [`CredentialStore`]; the core only
//! reads back the stored hash for verification and writes a replacement hash
//! on password change. Plaintext passwords never cross this boundary.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::error::{AuthError, AuthResult};
use crate::principal::Role;

// =============================================================================
// StoredCredential
// =============================================================================

/// A credential record as held by the storage collaborator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredCredential {
    /// User ID.
    pub user_id: i64,
    /// Login identity (username or email).
    pub identity: String,
    /// PHC-format password hash.
    pub password_hash: String,
    /// Role granted to sessions for this user.
    pub role: Role,
}

impl StoredCredential {
    /// Creates a new credential record.
    pub fn new(
        user_id: i64,
        identity: impl Into<String>,
        password_hash: impl Into<String>,
        role: Role,
    ) -> Self {
        Self {
            user_id,
            identity: identity.into(),
            password_hash: password_hash.into(),
            role,
        }
    }
}

// =============================================================================
// CredentialStore
// =============================================================================

/// Capability interface over the user-storage collaborator.
///
/// Only the operations the auth core needs are present; full user CRUD
/// belongs to the resource services.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Fetches the credential for a login identity.
    ///
    /// Returns `Ok(None)` for an unknown identity; the caller converts that
    /// into the same failure as a wrong password.
    async fn fetch_by_identity(&self, identity: &str) -> AuthResult<Option<StoredCredential>>;

    /// Fetches the credential for a user ID.
    ///
    /// Used on token refresh to pick up the user's current role.
    async fn fetch_by_id(&self, user_id: i64) -> AuthResult<Option<StoredCredential>>;

    /// Replaces the stored password hash for a user.
    async fn update_password(&self, user_id: i64, password_hash: &str) -> AuthResult<()>;
}

// =============================================================================
// InMemoryCredentialStore
// =============================================================================

/// In-memory credential store for tests and the demo binary.
#[derive(Debug, Default)]
pub struct InMemoryCredentialStore {
    records: RwLock<HashMap<i64, StoredCredential>>,
}

impl InMemoryCredentialStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store seeded with the given credentials.
    pub fn with_credentials(credentials: impl IntoIterator<Item = StoredCredential>) -> Self {
        let records = credentials
            .into_iter()
            .map(|c| (c.user_id, c))
            .collect();
        Self {
            records: RwLock::new(records),
        }
    }

    /// Inserts or replaces a credential record.
    pub async fn insert(&self, credential: StoredCredential) {
        self.records
            .write()
            .await
            .insert(credential.user_id, credential);
    }

    /// Returns the number of stored records.
    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    /// Returns `true` if the store is empty.
    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}

#[async_trait]
impl CredentialStore for InMemoryCredentialStore {
    async fn fetch_by_identity(&self, identity: &str) -> AuthResult<Option<StoredCredential>> {
        let records = self.records.read().await;
        Ok(records
            .values()
            .find(|c| c.identity == identity)
            .cloned())
    }

    async fn fetch_by_id(&self, user_id: i64) -> AuthResult<Option<StoredCredential>> {
        Ok(self.records.read().await.get(&user_id).cloned())
    }

    async fn update_password(&self, user_id: i64, password_hash: &str) -> AuthResult<()> {
        let mut records = self.records.write().await;
        let record = records
            .get_mut(&user_id)
            .ok_or_else(|| AuthError::store(format!("unknown user id {}", user_id)))?;
        record.password_hash = password_hash.to_string();
        Ok(())
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn alice() -> StoredCredential {
        StoredCredential::new(7, "alice@example.com", "$argon2id$stub", Role::User)
    }

    #[tokio::test]
    async fn test_fetch_by_identity() {
        let store = InMemoryCredentialStore::with_credentials([alice()]);

        let found = store.fetch_by_identity("alice@example.com").await.unwrap();
        assert_eq!(found, Some(alice()));

        let missing = store.fetch_by_identity("nobody@example.com").await.unwrap();
        assert!(missing.is_none());
    }

    #[tokio::test]
    async fn test_fetch_by_id() {
        let store = InMemoryCredentialStore::with_credentials([alice()]);

        assert!(store.fetch_by_id(7).await.unwrap().is_some());
        assert!(store.fetch_by_id(8).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_update_password() {
        let store = InMemoryCredentialStore::with_credentials([alice()]);

        store.update_password(7, "$argon2id$replaced").await.unwrap();
        let record = store.fetch_by_id(7).await.unwrap().unwrap();
        assert_eq!(record.password_hash, "$argon2id$replaced");
    }

    #[tokio::test]
    async fn test_update_password_unknown_user() {
        let store = InMemoryCredentialStore::new();

        let result = store.update_password(99, "$argon2id$stub").await;
        assert!(matches!(result, Err(AuthError::Store { .. })));
    }
}
