// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Pre-built test data and application wiring.
//!
//! The seeded credential fixtures:
//!
//! | user | id | role | password |
//! |---|---|---|---|
//! | `alice@example.com` | 7 | user | `alice-password` |
//! | `bob@example.com` | 8 | user | `bob-password-1` |
//! | `carol@example.com` | 2 | admin | `carol-password` |
//! | `root@example.com` | 1 | superadmin | `root-password-9` |
//!
//! The events fixture: event `100` is owned by Alice (7), event `200` by
//! Bob (8).

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use axum::{
    extract::{Path, State},
    response::IntoResponse,
    routing::put,
    Extension, Json, Router,
};

use warden_api::{
    ApiConfig, ApiError, ApiResult, ApiServer, AppState, CurrentUser, JwtConfig, JwtManager,
};
use warden_core::{
    Argon2Securer, InMemoryAuditLogger, InMemoryCredentialStore, PasswordSecurer, Role,
    StoredCredential,
};

/// Test signing secret.
pub const TEST_SECRET: &str = "test-secret-key-that-is-long-enough-for-testing";

/// Creates a test JWT configuration with a valid secret.
pub fn test_jwt_config() -> JwtConfig {
    JwtConfig::new(TEST_SECRET)
}

/// Creates a test API configuration.
pub fn test_api_config() -> ApiConfig {
    ApiConfig::default().with_jwt(test_jwt_config())
}

/// Creates a store seeded with the fixture credentials.
pub fn seeded_store(securer: &dyn PasswordSecurer) -> InMemoryCredentialStore {
    let hash = |plain: &str| securer.hash(plain).expect("fixture hash");
    InMemoryCredentialStore::with_credentials([
        StoredCredential::new(7, "alice@example.com", hash("alice-password"), Role::User),
        StoredCredential::new(8, "bob@example.com", hash("bob-password-1"), Role::User),
        StoredCredential::new(2, "carol@example.com", hash("carol-password"), Role::Admin),
        StoredCredential::new(1, "root@example.com", hash("root-password-9"), Role::Superadmin),
    ])
}

/// Builds a fully wired test state with the seeded store and an in-memory
/// audit logger.
pub fn test_state() -> (AppState, Arc<InMemoryAuditLogger>) {
    let securer = Argon2Securer::new(8);
    let store = seeded_store(&securer);
    let audit = Arc::new(InMemoryAuditLogger::new());

    let state = AppState::builder()
        .config(test_api_config())
        .credential_store(Arc::new(store))
        .securer(Arc::new(securer))
        .audit_logger(audit.clone())
        .build()
        .expect("test state");

    (state, audit)
}

/// Returns the token authority for the test secret.
pub fn test_jwt() -> JwtManager {
    JwtManager::new(test_jwt_config()).expect("test jwt manager")
}

// =============================================================================
// Fake Resource Service
// =============================================================================

/// Flag recording whether any resource handler body executed.
///
/// Lets tests assert the session middleware short-circuited *before* the
/// resource service ran.
#[derive(Debug, Clone)]
pub struct HandlerTouched(pub Arc<AtomicBool>);

/// Owner lookup for the events fixture.
fn event_owner(event_id: i64) -> Option<i64> {
    match event_id {
        100 => Some(7),
        200 => Some(8),
        _ => None,
    }
}

/// PUT /api/v1/events/{id}
///
/// A stand-in for an external resource service: it consumes the principal
/// attached by the session middleware and asks the access policy before
/// touching its data.
async fn update_event(
    State(state): State<AppState>,
    Extension(touched): Extension<HandlerTouched>,
    CurrentUser(principal): CurrentUser,
    Path(event_id): Path<i64>,
) -> ApiResult<impl IntoResponse> {
    touched.0.store(true, Ordering::SeqCst);

    let owner_id = event_owner(event_id).ok_or_else(|| ApiError::not_found("event"))?;

    if !state
        .policy()
        .is_allowed(&principal, "update", "event", Some(owner_id))
    {
        return Err(ApiError::forbidden("Insufficient permissions"));
    }

    Ok(Json(serde_json::json!({ "id": event_id, "updated_by": principal.id })))
}

/// Builds the full test router: Warden's routes plus the fake events
/// resource behind the same session layer, and a flag that flips when the
/// resource handler actually runs.
pub fn test_router(state: AppState) -> (Router, Arc<AtomicBool>) {
    let touched = Arc::new(AtomicBool::new(false));

    let events = Router::new()
        .route("/api/v1/events/{id}", put(update_event))
        .layer(Extension(HandlerTouched(touched.clone())));

    let router = ApiServer::new(state).router_with(events);
    (router, touched)
}
