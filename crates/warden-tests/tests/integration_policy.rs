// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # Access Policy Integration Tests
//!
//! End-to-end tests for RBAC decisions and owner overrides, driven through
//! the real router with a stand-in resource service:
//!
//! - `test_policy_*`: Policy table semantics
//! - `test_owner_*`: Owner override semantics
//! - `test_e2e_*`: Full login-to-denial scenarios

use axum::{
    body::{to_bytes, Body},
    http::{header, Request, StatusCode},
    Router,
};
use tower::ServiceExt;

use warden_api::default_policy;
use warden_core::{Principal, Role};

use warden_tests::common::{init_test_logging, test_router, test_state};

// =============================================================================
// Test Helpers
// =============================================================================

async fn send(router: &Router, request: Request<Body>) -> (StatusCode, serde_json::Value) {
    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = if bytes.is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

async fn login_token(router: &Router, identity: &str, password: &str) -> String {
    let request = Request::builder()
        .method("POST")
        .uri("/api/v1/auth/login")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(
            serde_json::json!({ "identity": identity, "password": password }).to_string(),
        ))
        .unwrap();

    let (status, body) = send(router, request).await;
    assert_eq!(status, StatusCode::OK);
    body["token"].as_str().unwrap().to_string()
}

fn update_event(event_id: i64, token: &str) -> Request<Body> {
    Request::builder()
        .method("PUT")
        .uri(format!("/api/v1/events/{}", event_id))
        .header(header::AUTHORIZATION, format!("Bearer {}", token))
        .body(Body::empty())
        .unwrap()
}

// =============================================================================
// Policy Table Tests
// =============================================================================

#[test]
fn test_policy_deny_by_default() {
    let policy = default_policy();
    let user = Principal::new(7, Role::User);

    // No entry, no owner: denied.
    assert!(!policy.is_allowed(&user, "publish", "event", None));
    assert!(!policy.is_allowed(&user, "delete", "user", Some(7)));
}

#[test]
fn test_policy_hierarchy_flattened_at_build() {
    let policy = default_policy();

    // Admin inherits user grants; superadmin inherits admin's.
    assert!(policy.role_can(Role::Admin, "event", "create"));
    assert!(policy.role_can(Role::Superadmin, "event", "update"));
    assert!(policy.role_can(Role::Superadmin, "user", "create"));
    assert!(!policy.role_can(Role::Admin, "user", "create"));
}

// =============================================================================
// Owner Override Tests
// =============================================================================

#[tokio::test]
async fn test_owner_can_update_own_event() {
    init_test_logging();
    let (state, _) = test_state();
    let (router, _) = test_router(state);

    // Alice (7) owns event 100.
    let token = login_token(&router, "alice@example.com", "alice-password").await;
    let (status, body) = send(&router, update_event(100, &token)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["updated_by"], 7);
}

#[tokio::test]
async fn test_owner_override_denies_other_users_event() {
    init_test_logging();
    let (state, _) = test_state();
    let (router, _) = test_router(state);

    // Event 200 is Bob's; Alice holds no role grant for event update.
    let token = login_token(&router, "alice@example.com", "alice-password").await;
    let (status, body) = send(&router, update_event(200, &token)).await;

    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"]["code"], "FORBIDDEN");
}

#[tokio::test]
async fn test_admin_updates_any_event() {
    init_test_logging();
    let (state, _) = test_state();
    let (router, _) = test_router(state);

    let token = login_token(&router, "carol@example.com", "carol-password").await;

    let (status, _) = send(&router, update_event(100, &token)).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = send(&router, update_event(200, &token)).await;
    assert_eq!(status, StatusCode::OK);
}

// =============================================================================
// End-to-End Scenarios
// =============================================================================

#[tokio::test]
async fn test_e2e_forbidden_is_distinct_from_unauthenticated() {
    init_test_logging();
    let (state, _) = test_state();
    let (router, _) = test_router(state);

    // Unauthenticated: 401.
    let request = Request::builder()
        .method("PUT")
        .uri("/api/v1/events/200")
        .body(Body::empty())
        .unwrap();
    let (status, body) = send(&router, request).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"]["code"], "UNAUTHORIZED");

    // Authenticated but not authorized: 403.
    let token = login_token(&router, "alice@example.com", "alice-password").await;
    let (status, body) = send(&router, update_event(200, &token)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"]["code"], "FORBIDDEN");
}

#[tokio::test]
async fn test_e2e_unknown_event_is_not_found() {
    init_test_logging();
    let (state, _) = test_state();
    let (router, _) = test_router(state);

    let token = login_token(&router, "carol@example.com", "carol-password").await;
    let (status, _) = send(&router, update_event(999, &token)).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_e2e_superadmin_keeps_inherited_access() {
    init_test_logging();
    let (state, _) = test_state();
    let (router, _) = test_router(state);

    let token = login_token(&router, "root@example.com", "root-password-9").await;
    let (status, _) = send(&router, update_event(100, &token)).await;

    assert_eq!(status, StatusCode::OK);
}
