// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Authentication handlers.

use axum::{extract::State, response::IntoResponse, Json};
use serde::Deserialize;

use warden_core::AuditLog;

use crate::error::ApiResult;
use crate::extractors::{ClientIp, CurrentUser};
use crate::response::{ApiResponse, AuthResponse, PrincipalResponse};
use crate::state::AppState;

// =============================================================================
// Login
// =============================================================================

/// Login request body.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    /// Username or email.
    pub identity: String,
    /// Password.
    pub password: String,
}

/// POST /api/v1/auth/login
///
/// Authenticates a user and returns an access/refresh token pair.
pub async fn login(
    State(state): State<AppState>,
    ClientIp(client_ip): ClientIp,
    Json(request): Json<LoginRequest>,
) -> ApiResult<impl IntoResponse> {
    let outcome = state
        .auth()
        .login(&request.identity, &request.password, client_ip)
        .await?;

    let mut response = AuthResponse::new(outcome.token, outcome.expires_in);
    if let Some(refresh) = outcome.refresh_token {
        response = response.with_refresh_token(refresh);
    }

    Ok(Json(response))
}

// =============================================================================
// Refresh Token
// =============================================================================

/// Refresh token request body.
#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    /// Refresh token.
    pub refresh_token: String,
}

/// POST /api/v1/auth/refresh
///
/// Exchanges a refresh token for a new access token.
pub async fn refresh_token(
    State(state): State<AppState>,
    Json(request): Json<RefreshRequest>,
) -> ApiResult<impl IntoResponse> {
    let outcome = state.auth().refresh(&request.refresh_token).await?;

    Ok(Json(AuthResponse::new(outcome.token, outcome.expires_in)))
}

// =============================================================================
// Logout
// =============================================================================

/// POST /api/v1/auth/logout
///
/// Logs out the current user. Sessions are stateless: the access token stays
/// valid until its expiry, this endpoint only records the logout and lets the
/// client discard its tokens.
pub async fn logout(
    State(state): State<AppState>,
    CurrentUser(principal): CurrentUser,
    ClientIp(client_ip): ClientIp,
) -> ApiResult<impl IntoResponse> {
    let entry = AuditLog::logout(&principal, client_ip);
    let logger = state.audit().clone();
    tokio::spawn(async move {
        if let Err(e) = logger.log(entry).await {
            tracing::warn!(error = %e, "Failed to log logout");
        }
    });

    tracing::info!(user_id = principal.id, "User logged out");

    Ok(Json(ApiResponse::success(serde_json::json!({
        "message": "Logged out successfully"
    }))))
}

// =============================================================================
// Current User
// =============================================================================

/// GET /api/v1/auth/me
///
/// Returns the authenticated principal for this session.
pub async fn current_user(CurrentUser(principal): CurrentUser) -> ApiResult<impl IntoResponse> {
    Ok(Json(PrincipalResponse::from(principal)))
}

// =============================================================================
// Change Password
// =============================================================================

/// Change password request body.
#[derive(Debug, Deserialize)]
pub struct ChangePasswordRequest {
    /// Current password.
    pub current_password: String,
    /// New password.
    pub new_password: String,
}

/// POST /api/v1/auth/change-password
///
/// Changes the password for the current user.
pub async fn change_password(
    State(state): State<AppState>,
    CurrentUser(principal): CurrentUser,
    ClientIp(client_ip): ClientIp,
    Json(request): Json<ChangePasswordRequest>,
) -> ApiResult<impl IntoResponse> {
    state
        .auth()
        .change_password(
            &principal,
            &request.current_password,
            &request.new_password,
            client_ip,
        )
        .await?;

    Ok(Json(ApiResponse::success(serde_json::json!({
        "message": "Password changed successfully"
    }))))
}
