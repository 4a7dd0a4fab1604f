// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # Core Integration Tests
//!
//! Tests for the credential-security properties and for the auth service
//! composed with substitutable fakes:
//!
//! - `test_secure_*`: Hashing and strength properties
//! - `test_service_*`: Auth service against mock collaborators

use std::sync::Arc;

use warden_api::{AuthService, JwtManager};
use warden_core::{
    Argon2Securer, AuthError, InMemoryAuditLogger, InMemoryCredentialStore, PasswordSecurer, Role,
    StoredCredential,
};

use warden_tests::common::{
    init_test_logging, test_jwt_config, FailingStore, PlainSecurer,
};

// =============================================================================
// Credential Security Properties
// =============================================================================

#[test]
fn test_secure_verify_accepts_own_hash() {
    let securer = Argon2Securer::new(8);

    for password in ["short-but-ok", "correct horse battery staple", "überpaßwort"] {
        let hash = securer.hash(password).unwrap();
        assert!(securer.verify(password, &hash), "failed for {:?}", password);
    }
}

#[test]
fn test_secure_verify_rejects_other_passwords() {
    let securer = Argon2Securer::new(8);

    let hash = securer.hash("password-one").unwrap();
    assert!(!securer.verify("password-two", &hash));
    assert!(!securer.verify("password-one ", &hash));
    assert!(!securer.verify("", &hash));
}

#[test]
fn test_secure_strength_boundary_is_inclusive() {
    let securer = Argon2Securer::new(10);

    assert!(!securer.validate_strength(&"x".repeat(9)));
    assert!(securer.validate_strength(&"x".repeat(10)));
    assert!(securer.validate_strength(&"x".repeat(11)));
}

#[test]
fn test_secure_strength_counts_characters_not_bytes() {
    let securer = Argon2Securer::new(8);

    // Eight two-byte characters satisfy an eight-character minimum.
    assert!(securer.validate_strength("éééééééé"));
}

// =============================================================================
// Auth Service with Mock Collaborators
// =============================================================================

fn jwt() -> Arc<JwtManager> {
    Arc::new(JwtManager::new(test_jwt_config()).unwrap())
}

#[tokio::test]
async fn test_service_works_with_substitute_securer() {
    init_test_logging();

    let securer = PlainSecurer::new(8);
    let store = InMemoryCredentialStore::with_credentials([StoredCredential::new(
        7,
        "alice@example.com",
        securer.hash("alice-password").unwrap(),
        Role::User,
    )]);

    let service = AuthService::new(
        Arc::new(store),
        Arc::new(securer),
        jwt(),
        Arc::new(InMemoryAuditLogger::new()),
    );

    let outcome = service
        .login("alice@example.com", "alice-password", None)
        .await
        .unwrap();
    assert_eq!(outcome.principal.id, 7);

    let denied = service.login("alice@example.com", "wrong", None).await;
    assert!(matches!(denied, Err(AuthError::InvalidCredentials)));
}

#[tokio::test]
async fn test_service_surfaces_store_outage_as_store_error() {
    init_test_logging();

    let service = AuthService::new(
        Arc::new(FailingStore),
        Arc::new(PlainSecurer::new(8)),
        jwt(),
        Arc::new(InMemoryAuditLogger::new()),
    );

    let result = service.login("alice@example.com", "alice-password", None).await;

    // A backend outage is not an authentication failure.
    match result {
        Err(AuthError::Store { .. }) => {}
        other => panic!("expected store error, got {:?}", other.map(|_| ())),
    }
}

#[tokio::test]
async fn test_service_store_error_is_not_leaked_as_credentials() {
    init_test_logging();

    let service = AuthService::new(
        Arc::new(FailingStore),
        Arc::new(PlainSecurer::new(8)),
        jwt(),
        Arc::new(InMemoryAuditLogger::new()),
    );

    let err = service
        .login("alice@example.com", "alice-password", None)
        .await
        .unwrap_err();

    assert!(!err.is_authentication());
    assert_eq!(err.status_code(), 500);
}
