// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Core authentication flows.
//!
//! `AuthService` composes the credential store, the password securer, and
//! the token authority into the three flows the login surface needs: login,
//! token refresh, and password change. An unknown identity and a wrong
//! password produce the same `InvalidCredentials` failure.

use std::net::IpAddr;
use std::sync::Arc;

use warden_core::{
    AuditLog, AuditLogger, AuthError, AuthResult, CredentialStore, PasswordSecurer, Principal,
};

use super::claims::TokenKind;
use super::jwt::JwtManager;

// =============================================================================
// LoginOutcome
// =============================================================================

/// The result of a successful login or refresh.
#[derive(Debug, Clone)]
pub struct LoginOutcome {
    /// Signed access token.
    pub token: String,
    /// Signed refresh token, when one was minted.
    pub refresh_token: Option<String>,
    /// Access token lifetime in seconds.
    pub expires_in: i64,
    /// The authenticated principal.
    pub principal: Principal,
}

// =============================================================================
// AuthService
// =============================================================================

/// Composes store, securer, and token authority into the login surface.
#[derive(Clone)]
pub struct AuthService {
    store: Arc<dyn CredentialStore>,
    securer: Arc<dyn PasswordSecurer>,
    jwt: Arc<JwtManager>,
    audit: Arc<dyn AuditLogger>,
}

impl AuthService {
    /// Creates a new auth service.
    pub fn new(
        store: Arc<dyn CredentialStore>,
        securer: Arc<dyn PasswordSecurer>,
        jwt: Arc<JwtManager>,
        audit: Arc<dyn AuditLogger>,
    ) -> Self {
        Self {
            store,
            securer,
            jwt,
            audit,
        }
    }

    /// Returns the token authority.
    pub fn jwt(&self) -> &JwtManager {
        &self.jwt
    }

    /// Returns the password securer.
    pub fn securer(&self) -> &Arc<dyn PasswordSecurer> {
        &self.securer
    }

    /// Authenticates an identity/password pair and issues a token pair.
    pub async fn login(
        &self,
        identity: &str,
        password: &str,
        client_ip: Option<IpAddr>,
    ) -> AuthResult<LoginOutcome> {
        if identity.is_empty() || password.is_empty() {
            return Err(AuthError::invalid_input(
                "Identity and password are required",
            ));
        }

        let Some(credential) = self.store.fetch_by_identity(identity).await? else {
            self.record(AuditLog::login(identity, client_ip, false)).await;
            return Err(AuthError::InvalidCredentials);
        };

        if !self.securer.verify(password, &credential.password_hash) {
            self.record(AuditLog::login(identity, client_ip, false)).await;
            return Err(AuthError::InvalidCredentials);
        }

        let principal = Principal::new(credential.user_id, credential.role);

        let token = self.jwt.issue(&principal)?;
        let refresh_token = self.jwt.issue_refresh(&principal)?;

        self.record(AuditLog::login(identity, client_ip, true)).await;
        tracing::info!(user_id = principal.id, role = %principal.role, "User logged in");

        Ok(LoginOutcome {
            token,
            refresh_token: Some(refresh_token),
            expires_in: self.jwt.ttl_secs(),
            principal,
        })
    }

    /// Exchanges a refresh token for a new access token.
    ///
    /// The user's current role is read back from the store, so a role change
    /// takes effect on the next refresh rather than waiting out the refresh
    /// window.
    pub async fn refresh(&self, refresh_token: &str) -> AuthResult<LoginOutcome> {
        let claims = self.jwt.validate(refresh_token)?;
        if claims.kind != TokenKind::Refresh {
            return Err(AuthError::invalid_input("Not a refresh token"));
        }

        let stale = claims.principal()?;
        let credential = self
            .store
            .fetch_by_id(stale.id)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        let principal = Principal::new(credential.user_id, credential.role);
        let token = self.jwt.issue(&principal)?;

        self.record(AuditLog::token_refresh(principal.id)).await;
        tracing::debug!(user_id = principal.id, "Token refreshed");

        Ok(LoginOutcome {
            token,
            refresh_token: None,
            expires_in: self.jwt.ttl_secs(),
            principal,
        })
    }

    /// Changes the password for an authenticated principal.
    ///
    /// The current password must verify, and the new password must satisfy
    /// the strength policy.
    pub async fn change_password(
        &self,
        principal: &Principal,
        current: &str,
        new: &str,
        client_ip: Option<IpAddr>,
    ) -> AuthResult<()> {
        if !self.securer.validate_strength(new) {
            return Err(AuthError::invalid_input(format!(
                "Password must be at least {} characters",
                self.securer.min_password_length()
            )));
        }
        if new == current {
            return Err(AuthError::invalid_input(
                "New password must be different from current password",
            ));
        }

        let credential = self
            .store
            .fetch_by_id(principal.id)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        if !self.securer.verify(current, &credential.password_hash) {
            self.record(AuditLog::password_change(principal.id, client_ip, false))
                .await;
            return Err(AuthError::InvalidCredentials);
        }

        let new_hash = self.securer.hash(new)?;
        self.store.update_password(principal.id, &new_hash).await?;

        self.record(AuditLog::password_change(principal.id, client_ip, true))
            .await;
        tracing::info!(user_id = principal.id, "Password changed");

        Ok(())
    }

    /// Records an audit entry, never failing the calling flow.
    async fn record(&self, entry: AuditLog) {
        if let Err(e) = self.audit.log(entry).await {
            tracing::warn!(error = %e, "Failed to write audit entry");
        }
    }
}

impl std::fmt::Debug for AuthService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthService").finish_non_exhaustive()
    }
}

// =============================================================================
// Tests
// =============================================================================
