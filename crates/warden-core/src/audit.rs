// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Security audit logging.
//!
//! Every security-relevant event (login success/failure, logout, password
//! change, authorization denial, token refresh) is recorded as a structured
//! [`AuditLog`] entry through the [`AuditLogger`] trait. Handlers log
//! out-of-band so a slow audit sink never blocks a request.

use std::net::IpAddr;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::principal::Principal;

/// Result type alias for audit operations.
pub type AuditResult<T> = Result<T, AuditError>;

/// Audit logging errors.
#[derive(Debug, Error)]
pub enum AuditError {
    /// The audit sink rejected or failed to persist an entry.
    #[error("Audit sink error: {0}")]
    Sink(String),
}

// =============================================================================
// AuditAction / ActionResult
// =============================================================================

/// Security-relevant actions recorded in the audit log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditAction {
    /// A login attempt.
    Login,
    /// An explicit logout.
    Logout,
    /// An access token re-issued from a refresh token.
    TokenRefresh,
    /// A password change.
    PasswordChange,
    /// An authorization denial.
    AccessDenied,
}

/// The outcome of an audited action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionResult {
    /// The action succeeded.
    Success,
    /// The action failed.
    Failure {
        /// Why the action failed.
        reason: String,
    },
}

impl ActionResult {
    /// Creates a failure result with the given reason.
    pub fn failure(reason: impl Into<String>) -> Self {
        Self::Failure {
            reason: reason.into(),
        }
    }

    /// Returns `true` if the action succeeded.
    pub fn is_success(&self) -> bool {
        matches!(self, ActionResult::Success)
    }
}

// =============================================================================
// AuditLog
// =============================================================================

/// A structured audit log entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditLog {
    /// Unique log entry ID.
    pub id: Uuid,
    /// When the event occurred.
    pub timestamp: DateTime<Utc>,
    /// The action that was performed.
    pub action: AuditAction,
    /// The result of the action.
    pub result: ActionResult,
    /// User ID, when known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<i64>,
    /// Login identity, for pre-authentication events.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub identity: Option<String>,
    /// Client IP address.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_ip: Option<IpAddr>,
    /// Affected resource, for authorization events.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resource: Option<String>,
    /// Additional detail about the event.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl AuditLog {
    /// Creates a new audit log entry.
    pub fn new(action: AuditAction, result: ActionResult) -> Self {
        Self {
            id: Uuid::now_v7(),
            timestamp: Utc::now(),
            action,
            result,
            user_id: None,
            identity: None,
            client_ip: None,
            resource: None,
            detail: None,
        }
    }

    /// Sets the client IP.
    pub fn with_client_ip(mut self, client_ip: Option<IpAddr>) -> Self {
        self.client_ip = client_ip;
        self
    }

    /// Sets the detail message.
    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    // =========================================================================
    // Factory methods for common events
    // =========================================================================

    /// Records a login attempt against an identity.
    pub fn login(identity: impl Into<String>, client_ip: Option<IpAddr>, success: bool) -> Self {
        let result = if success {
            ActionResult::Success
        } else {
            ActionResult::failure("Invalid credentials")
        };

        let mut log = Self::new(AuditAction::Login, result).with_client_ip(client_ip);
        log.identity = Some(identity.into());
        log
    }

    /// Records a logout.
    pub fn logout(principal: &Principal, client_ip: Option<IpAddr>) -> Self {
        let mut log =
            Self::new(AuditAction::Logout, ActionResult::Success).with_client_ip(client_ip);
        log.user_id = Some(principal.id);
        log
    }

    /// Records a token refresh.
    pub fn token_refresh(user_id: i64) -> Self {
        let mut log = Self::new(AuditAction::TokenRefresh, ActionResult::Success);
        log.user_id = Some(user_id);
        log
    }

    /// Records a password change attempt.
    pub fn password_change(user_id: i64, client_ip: Option<IpAddr>, success: bool) -> Self {
        let result = if success {
            ActionResult::Success
        } else {
            ActionResult::failure("Current password did not verify")
        };

        let mut log = Self::new(AuditAction::PasswordChange, result).with_client_ip(client_ip);
        log.user_id = Some(user_id);
        log
    }

    /// Records an authorization denial.
    pub fn access_denied(
        principal: &Principal,
        resource: &str,
        action: &str,
        client_ip: Option<IpAddr>,
    ) -> Self {
        let mut log = Self::new(
            AuditAction::AccessDenied,
            ActionResult::failure(format!("{} on {} denied", action, resource)),
        )
        .with_client_ip(client_ip);
        log.user_id = Some(principal.id);
        log.resource = Some(resource.to_string());
        log
    }
}

// =============================================================================
// AuditLogger
// =============================================================================

/// Trait for audit logger implementations.
#[async_trait]
pub trait AuditLogger: Send + Sync {
    /// Records an audit log entry.
    async fn log(&self, entry: AuditLog) -> AuditResult<()>;

    /// Flushes any buffered entries.
    async fn flush(&self) -> AuditResult<()> {
        Ok(())
    }
}

// =============================================================================
// NoOpAuditLogger
// =============================================================================

/// Audit logger that discards every entry.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpAuditLogger;

#[async_trait]
impl AuditLogger for NoOpAuditLogger {
    async fn log(&self, _entry: AuditLog) -> AuditResult<()> {
        Ok(())
    }
}

// =============================================================================
// InMemoryAuditLogger
// =============================================================================

/// In-memory audit logger for testing and development.
///
/// Thread-safe; entries are kept in a `RwLock`-protected vector and can be
/// inspected directly from tests.
#[derive(Debug, Clone, Default)]
pub struct InMemoryAuditLogger {
    logs: Arc<RwLock<Vec<AuditLog>>>,
}

impl InMemoryAuditLogger {
    /// Creates a new empty logger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a snapshot of all recorded entries.
    pub fn entries(&self) -> Vec<AuditLog> {
        self.logs.read().clone()
    }

    /// Returns the number of recorded entries.
    pub fn len(&self) -> usize {
        self.logs.read().len()
    }

    /// Returns `true` if no entries have been recorded.
    pub fn is_empty(&self) -> bool {
        self.logs.read().is_empty()
    }

    /// Removes all recorded entries.
    pub fn clear(&self) {
        self.logs.write().clear();
    }
}

#[async_trait]
impl AuditLogger for InMemoryAuditLogger {
    async fn log(&self, entry: AuditLog) -> AuditResult<()> {
        self.logs.write().push(entry);
        Ok(())
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::principal::Role;

    #[tokio::test]
    async fn test_memory_logger_records_entries() {
        let logger = InMemoryAuditLogger::new();

        logger
            .log(AuditLog::login("alice@example.com", None, true))
            .await
            .unwrap();
        logger
            .log(AuditLog::login("mallory@example.com", None, false))
            .await
            .unwrap();

        let entries = logger.entries();
        assert_eq!(entries.len(), 2);
        assert!(entries[0].result.is_success());
        assert!(!entries[1].result.is_success());
    }

    #[tokio::test]
    async fn test_memory_logger_clear() {
        let logger = InMemoryAuditLogger::new();
        logger.log(AuditLog::token_refresh(7)).await.unwrap();

        assert!(!logger.is_empty());
        logger.clear();
        assert!(logger.is_empty());
    }

    #[test]
    fn test_access_denied_entry() {
        let principal = Principal::new(7, Role::User);
        let entry = AuditLog::access_denied(&principal, "event", "update", None);

        assert_eq!(entry.action, AuditAction::AccessDenied);
        assert_eq!(entry.user_id, Some(7));
        assert_eq!(entry.resource.as_deref(), Some("event"));
        assert!(!entry.result.is_success());
    }

    #[test]
    fn test_login_entry_carries_identity_not_user_id() {
        let entry = AuditLog::login("alice@example.com", None, false);

        assert_eq!(entry.identity.as_deref(), Some("alice@example.com"));
        assert!(entry.user_id.is_none());
    }
}
