// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Application state shared across handlers.

use std::sync::Arc;

use warden_core::{
    Argon2Securer, AuditLogger, CredentialStore, InMemoryCredentialStore, NoOpAuditLogger,
    PasswordSecurer,
};

use crate::auth::{default_policy, AccessPolicy, AuthService, JwtManager};
use crate::config::ApiConfig;
use crate::error::ApiResult;

// =============================================================================
// AppState
// =============================================================================

/// Application state shared across all handlers.
///
/// Built once before the server starts serving and never mutated; every
/// component is behind an `Arc` and safe to use from concurrent handlers
/// without locking.
#[derive(Clone)]
pub struct AppState {
    /// API configuration.
    pub config: Arc<ApiConfig>,
    /// Token authority.
    pub jwt_manager: Arc<JwtManager>,
    /// Access policy.
    pub policy: Arc<AccessPolicy>,
    /// Auth service composing store, securer, and token authority.
    pub auth_service: Arc<AuthService>,
    /// Audit logger.
    pub audit_logger: Arc<dyn AuditLogger>,
}

impl AppState {
    /// Creates a new app state builder.
    pub fn builder() -> AppStateBuilder {
        AppStateBuilder::new()
    }

    /// Returns the token authority.
    pub fn jwt(&self) -> &JwtManager {
        &self.jwt_manager
    }

    /// Returns the access policy.
    pub fn policy(&self) -> &AccessPolicy {
        &self.policy
    }

    /// Returns the auth service.
    pub fn auth(&self) -> &AuthService {
        &self.auth_service
    }

    /// Returns the audit logger.
    pub fn audit(&self) -> &Arc<dyn AuditLogger> {
        &self.audit_logger
    }
}

// =============================================================================
// AppStateBuilder
// =============================================================================

/// Builder for constructing [`AppState`].
pub struct AppStateBuilder {
    config: Option<ApiConfig>,
    jwt_manager: Option<Arc<JwtManager>>,
    policy: Option<Arc<AccessPolicy>>,
    store: Option<Arc<dyn CredentialStore>>,
    securer: Option<Arc<dyn PasswordSecurer>>,
    audit_logger: Option<Arc<dyn AuditLogger>>,
}

impl AppStateBuilder {
    /// Creates a new builder.
    pub fn new() -> Self {
        Self {
            config: None,
            jwt_manager: None,
            policy: None,
            store: None,
            securer: None,
            audit_logger: None,
        }
    }

    /// Sets the configuration.
    pub fn config(mut self, config: ApiConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Sets the token authority.
    pub fn jwt_manager(mut self, manager: Arc<JwtManager>) -> Self {
        self.jwt_manager = Some(manager);
        self
    }

    /// Sets the access policy.
    pub fn policy(mut self, policy: Arc<AccessPolicy>) -> Self {
        self.policy = Some(policy);
        self
    }

    /// Sets the credential store.
    pub fn credential_store(mut self, store: Arc<dyn CredentialStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Sets the password securer.
    pub fn securer(mut self, securer: Arc<dyn PasswordSecurer>) -> Self {
        self.securer = Some(securer);
        self
    }

    /// Sets the audit logger.
    pub fn audit_logger(mut self, logger: Arc<dyn AuditLogger>) -> Self {
        self.audit_logger = Some(logger);
        self
    }

    /// Builds the [`AppState`].
    ///
    /// Components not supplied fall back to defaults derived from the
    /// configuration: an Argon2 securer with the configured minimum password
    /// length, the shipped policy, an empty in-memory store, and a no-op
    /// audit logger.
    pub fn build(self) -> ApiResult<AppState> {
        let config = self.config.unwrap_or_default();

        let jwt_manager = match self.jwt_manager {
            Some(manager) => manager,
            None => Arc::new(JwtManager::new(config.jwt.clone())?),
        };

        let policy = self.policy.unwrap_or_else(|| Arc::new(default_policy()));

        let securer: Arc<dyn PasswordSecurer> = self
            .securer
            .unwrap_or_else(|| Arc::new(Argon2Securer::new(config.min_password_length)));

        let store: Arc<dyn CredentialStore> = self
            .store
            .unwrap_or_else(|| Arc::new(InMemoryCredentialStore::new()));

        let audit_logger: Arc<dyn AuditLogger> = self
            .audit_logger
            .unwrap_or_else(|| Arc::new(NoOpAuditLogger));

        let auth_service = Arc::new(AuthService::new(
            store,
            securer,
            jwt_manager.clone(),
            audit_logger.clone(),
        ));

        Ok(AppState {
            config: Arc::new(config),
            jwt_manager,
            policy,
            auth_service,
            audit_logger,
        })
    }
}

impl Default for AppStateBuilder {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// FromRef implementations for extracting parts of state
// =============================================================================

impl axum::extract::FromRef<AppState> for Arc<JwtManager> {
    fn from_ref(state: &AppState) -> Self {
        state.jwt_manager.clone()
    }
}

impl axum::extract::FromRef<AppState> for Arc<AccessPolicy> {
    fn from_ref(state: &AppState) -> Self {
        state.policy.clone()
    }
}

impl axum::extract::FromRef<AppState> for Arc<ApiConfig> {
    fn from_ref(state: &AppState) -> Self {
        state.config.clone()
    }
}

impl axum::extract::FromRef<AppState> for Arc<AuthService> {
    fn from_ref(state: &AppState) -> Self {
        state.auth_service.clone()
    }
}

// =============================================================================
// Tests
// =============================================================================
