// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! JWT claims structure.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use warden_core::{AuthError, AuthResult, Principal, Role};

// =============================================================================
// TokenKind
// =============================================================================

/// Distinguishes access tokens from refresh tokens.
///
/// A refresh token is only good for minting a new access token; the session
/// middleware refuses it as a session credential.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    /// Session credential attached to API calls.
    #[default]
    Access,
    /// Long-lived credential exchanged for new access tokens.
    Refresh,
}

// =============================================================================
// Claims
// =============================================================================

/// JWT claims for a Warden session token.
///
/// The token is self-contained: everything needed to reconstruct the
/// [`Principal`] lives in the claims, so validation never touches a store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject - the user ID.
    pub sub: String,

    /// Role granted to this session.
    pub role: Role,

    /// Expiration time (Unix timestamp).
    pub exp: i64,

    /// Issued at time (Unix timestamp).
    pub iat: i64,

    /// Not before time (Unix timestamp).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nbf: Option<i64>,

    /// Issuer.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub iss: Option<String>,

    /// JWT ID.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub jti: Option<String>,

    /// Token kind (access or refresh).
    #[serde(default)]
    pub kind: TokenKind,
}

impl Claims {
    /// Creates claims for a principal, expiring `expires_in_secs` from now.
    pub fn new(principal: &Principal, expires_in_secs: i64) -> Self {
        let now = Utc::now().timestamp();

        Self {
            sub: principal.id.to_string(),
            role: principal.role,
            exp: now + expires_in_secs,
            iat: now,
            nbf: Some(now),
            iss: None,
            jti: Some(Uuid::now_v7().to_string()),
            kind: TokenKind::Access,
        }
    }

    /// Creates refresh claims for a principal.
    pub fn refresh(principal: &Principal, expires_in_secs: i64) -> Self {
        let mut claims = Self::new(principal, expires_in_secs);
        claims.kind = TokenKind::Refresh;
        claims
    }

    /// Sets the issuer.
    pub fn with_issuer(mut self, issuer: impl Into<String>) -> Self {
        self.iss = Some(issuer.into());
        self
    }

    /// Reconstructs the principal carried by these claims.
    ///
    /// Fails with `MalformedToken` if `sub` is not a numeric user ID.
    pub fn principal(&self) -> AuthResult<Principal> {
        let id = self.sub.parse::<i64>().map_err(|_| AuthError::MalformedToken)?;
        Ok(Principal::new(id, self.role))
    }

    /// Returns `true` if the expiry has elapsed.
    pub fn is_expired(&self) -> bool {
        Utc::now().timestamp() >= self.exp
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_claims_round_trip_principal() {
        let principal = Principal::new(42, Role::Admin);
        let claims = Claims::new(&principal, 3600);

        assert_eq!(claims.sub, "42");
        assert_eq!(claims.kind, TokenKind::Access);
        assert_eq!(claims.principal().unwrap(), principal);
        assert!(!claims.is_expired());
    }

    #[test]
    fn test_refresh_claims_kind() {
        let principal = Principal::new(7, Role::User);
        let claims = Claims::refresh(&principal, 86400);

        assert_eq!(claims.kind, TokenKind::Refresh);
        assert_eq!(claims.principal().unwrap(), principal);
    }

    #[test]
    fn test_non_numeric_subject_is_malformed() {
        let principal = Principal::new(7, Role::User);
        let mut claims = Claims::new(&principal, 3600);
        claims.sub = "not-a-number".to_string();

        assert!(matches!(claims.principal(), Err(AuthError::MalformedToken)));
    }

    #[test]
    fn test_expired_claims() {
        let principal = Principal::new(7, Role::User);
        let claims = Claims::new(&principal, -3600);

        assert!(claims.is_expired());
    }

    #[test]
    fn test_kind_defaults_to_access_in_serde() {
        let principal = Principal::new(7, Role::User);
        let claims = Claims::new(&principal, 3600);
        let mut value = serde_json::to_value(&claims).unwrap();

        // A token minted before the kind claim existed deserializes as access.
        value.as_object_mut().unwrap().remove("kind");
        let parsed: Claims = serde_json::from_value(value).unwrap();
        assert_eq!(parsed.kind, TokenKind::Access);
    }
}
