// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! JWT token authority.
//!
//! Issues and validates the signed session tokens that carry a
//! [`Principal`]. Tokens are self-contained; validation is O(1) and never
//! touches a store. There is no revocation state: logout does not invalidate
//! a live token, it simply stops the client from presenting one.

use std::sync::Arc;
use std::time::Duration;

use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use warden_core::{AuthError, AuthResult, Principal};

use super::claims::Claims;

// =============================================================================
// JwtConfig
// =============================================================================

/// Token authority configuration.
///
/// Built once at startup and never mutated; every field is read-only for the
/// life of the process.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct JwtConfig {
    /// Secret key for signing tokens.
    #[serde(skip_serializing)]
    pub secret: String,
    /// Token issuer.
    pub issuer: String,
    /// Access token lifetime in seconds.
    pub ttl_secs: i64,
    /// Refresh token lifetime in seconds.
    pub refresh_ttl_secs: i64,
    /// Algorithm to use for signing.
    #[serde(with = "algorithm_serde")]
    pub algorithm: Algorithm,
    /// Whether to validate the issuer.
    pub validate_issuer: bool,
    /// Clock skew tolerance in seconds. Zero means a token is valid strictly
    /// while `now < exp`.
    pub leeway_secs: u64,
}

impl Default for JwtConfig {
    fn default() -> Self {
        Self {
            secret: String::new(), // Must be set by the operator
            issuer: "warden".to_string(),
            ttl_secs: 3600,
            refresh_ttl_secs: 86400 * 7,
            algorithm: Algorithm::HS256,
            validate_issuer: true,
            leeway_secs: 0,
        }
    }
}

impl JwtConfig {
    /// Creates a new configuration with the given secret.
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
            ..Default::default()
        }
    }

    /// Sets the issuer.
    pub fn with_issuer(mut self, issuer: impl Into<String>) -> Self {
        self.issuer = issuer.into();
        self
    }

    /// Sets the access token lifetime.
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl_secs = ttl.as_secs() as i64;
        self
    }

    /// Sets the signing algorithm.
    pub fn with_algorithm(mut self, algorithm: Algorithm) -> Self {
        self.algorithm = algorithm;
        self
    }

    /// Validates the configuration.
    pub fn validate(&self) -> AuthResult<()> {
        if self.secret.is_empty() {
            return Err(AuthError::internal("JWT secret is not configured"));
        }
        if self.secret.len() < 32 {
            tracing::warn!("JWT secret is shorter than recommended (32 bytes)");
        }
        if !matches!(
            self.algorithm,
            Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512
        ) {
            return Err(AuthError::internal(format!(
                "unsupported signing algorithm {:?}: the token authority holds a shared secret, HMAC family only",
                self.algorithm
            )));
        }
        if self.ttl_secs <= 0 {
            return Err(AuthError::internal("token TTL must be positive"));
        }
        Ok(())
    }
}

// =============================================================================
// JwtManager
// =============================================================================

/// The token authority.
///
/// Issues signed tokens embedding a principal and an absolute expiry, and
/// validates presented tokens against the configured secret and algorithm.
/// The validation is pinned to exactly the configured algorithm, so a token
/// signed under any other algorithm fails as `SignatureInvalid`.
#[derive(Clone)]
pub struct JwtManager {
    config: Arc<JwtConfig>,
    encoding_key: Arc<EncodingKey>,
    decoding_key: Arc<DecodingKey>,
    validation: Arc<Validation>,
}

impl JwtManager {
    /// Creates a new token authority with the given configuration.
    pub fn new(config: JwtConfig) -> AuthResult<Self> {
        config.validate()?;

        let encoding_key = EncodingKey::from_secret(config.secret.as_bytes());
        let decoding_key = DecodingKey::from_secret(config.secret.as_bytes());

        let mut validation = Validation::new(config.algorithm);
        validation.leeway = config.leeway_secs;
        validation.validate_aud = false;
        if config.validate_issuer {
            validation.set_issuer(&[&config.issuer]);
        }

        Ok(Self {
            config: Arc::new(config),
            encoding_key: Arc::new(encoding_key),
            decoding_key: Arc::new(decoding_key),
            validation: Arc::new(validation),
        })
    }

    /// Signs a prepared claims set.
    pub fn sign(&self, claims: &Claims) -> AuthResult<String> {
        let header = Header::new(self.config.algorithm);

        encode(&header, claims, &self.encoding_key)
            .map_err(|e| AuthError::internal(format!("Failed to sign token: {}", e)))
    }

    /// Issues an access token for a principal using the configured TTL.
    pub fn issue(&self, principal: &Principal) -> AuthResult<String> {
        let claims = Claims::new(principal, self.config.ttl_secs).with_issuer(&self.config.issuer);
        self.sign(&claims)
    }

    /// Issues an access token with an explicit TTL.
    pub fn issue_with_ttl(&self, principal: &Principal, ttl: Duration) -> AuthResult<String> {
        let claims =
            Claims::new(principal, ttl.as_secs() as i64).with_issuer(&self.config.issuer);
        self.sign(&claims)
    }

    /// Issues a refresh token for a principal.
    pub fn issue_refresh(&self, principal: &Principal) -> AuthResult<String> {
        let claims =
            Claims::refresh(principal, self.config.refresh_ttl_secs).with_issuer(&self.config.issuer);
        self.sign(&claims)
    }

    /// Validates a token and returns its claims.
    ///
    /// Fails with `Expired` once the expiry has elapsed, `SignatureInvalid`
    /// for a bad signature, wrong algorithm, or wrong issuer, and
    /// `MalformedToken` for anything that does not parse as a token.
    pub fn validate(&self, token: &str) -> AuthResult<Claims> {
        decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::Expired,
                jsonwebtoken::errors::ErrorKind::InvalidSignature
                | jsonwebtoken::errors::ErrorKind::InvalidAlgorithm
                | jsonwebtoken::errors::ErrorKind::InvalidIssuer
                | jsonwebtoken::errors::ErrorKind::ImmatureSignature => AuthError::SignatureInvalid,
                _ => AuthError::MalformedToken,
            })
    }

    /// Validates an access token and returns the embedded principal.
    ///
    /// Refresh tokens are rejected here: they cannot be used as session
    /// credentials.
    pub fn validate_principal(&self, token: &str) -> AuthResult<Principal> {
        let claims = self.validate(token)?;
        if claims.kind != super::claims::TokenKind::Access {
            return Err(AuthError::SignatureInvalid);
        }
        claims.principal()
    }

    /// Returns the access token lifetime in seconds.
    pub fn ttl_secs(&self) -> i64 {
        self.config.ttl_secs
    }

    /// Returns the refresh token lifetime in seconds.
    pub fn refresh_ttl_secs(&self) -> i64 {
        self.config.refresh_ttl_secs
    }
}

impl std::fmt::Debug for JwtManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtManager")
            .field("issuer", &self.config.issuer)
            .field("algorithm", &self.config.algorithm)
            .field("ttl_secs", &self.config.ttl_secs)
            .finish()
    }
}

// =============================================================================
// Algorithm Serialization
// =============================================================================

mod algorithm_serde {
    use jsonwebtoken::Algorithm;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S>(algorithm: &Algorithm, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let s = match algorithm {
            Algorithm::HS256 => "HS256",
            Algorithm::HS384 => "HS384",
            Algorithm::HS512 => "HS512",
            Algorithm::RS256 => "RS256",
            Algorithm::RS384 => "RS384",
            Algorithm::RS512 => "RS512",
            Algorithm::ES256 => "ES256",
            Algorithm::ES384 => "ES384",
            Algorithm::PS256 => "PS256",
            Algorithm::PS384 => "PS384",
            Algorithm::PS512 => "PS512",
            Algorithm::EdDSA => "EdDSA",
        };
        s.serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Algorithm, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        match s.as_str() {
            "HS256" => Ok(Algorithm::HS256),
            "HS384" => Ok(Algorithm::HS384),
            "HS512" => Ok(Algorithm::HS512),
            "RS256" => Ok(Algorithm::RS256),
            "RS384" => Ok(Algorithm::RS384),
            "RS512" => Ok(Algorithm::RS512),
            "ES256" => Ok(Algorithm::ES256),
            "ES384" => Ok(Algorithm::ES384),
            "PS256" => Ok(Algorithm::PS256),
            "PS384" => Ok(Algorithm::PS384),
            "PS512" => Ok(Algorithm::PS512),
            "EdDSA" => Ok(Algorithm::EdDSA),
            _ => Err(serde::de::Error::custom(format!("Unknown algorithm: {}", s))),
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use warden_core::Role;

    fn test_config() -> JwtConfig {
        JwtConfig::new("test-secret-key-that-is-long-enough-for-testing")
    }

    fn manager() -> JwtManager {
        JwtManager::new(test_config()).unwrap()
    }

    #[test]
    fn test_empty_secret_rejected() {
        assert!(JwtManager::new(JwtConfig::default()).is_err());
    }

    #[test]
    fn test_non_hmac_algorithm_rejected() {
        let config = test_config().with_algorithm(Algorithm::RS256);
        assert!(JwtManager::new(config).is_err());
    }

    #[test]
    fn test_issue_and_validate_round_trip() {
        let authority = manager();
        let principal = Principal::new(42, Role::Admin);

        let token = authority.issue(&principal).unwrap();
        assert_eq!(token.split('.').count(), 3);

        let validated = authority.validate_principal(&token).unwrap();
        assert_eq!(validated, principal);
    }

    #[test]
    fn test_expired_token() {
        let authority = manager();
        let principal = Principal::new(7, Role::User);

        let claims = Claims::new(&principal, -3600).with_issuer("warden");
        let token = authority.sign(&claims).unwrap();

        assert!(matches!(
            authority.validate(&token),
            Err(AuthError::Expired)
        ));
    }

    #[test]
    fn test_flipped_signature_bit() {
        let authority = manager();
        let principal = Principal::new(7, Role::User);
        let token = authority.issue(&principal).unwrap();

        // Flip one bit in the signature segment.
        let dot = token.rfind('.').unwrap();
        let mut bytes = token.into_bytes();
        let target = dot + 1;
        bytes[target] = if bytes[target] == b'A' { b'B' } else { b'A' };
        let tampered = String::from_utf8(bytes).unwrap();

        assert!(matches!(
            authority.validate(&tampered),
            Err(AuthError::SignatureInvalid)
        ));
    }

    #[test]
    fn test_garbage_is_malformed() {
        let authority = manager();

        assert!(matches!(
            authority.validate("not-a-token"),
            Err(AuthError::MalformedToken)
        ));
        assert!(matches!(
            authority.validate("a.b.c"),
            Err(AuthError::MalformedToken)
        ));
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let issuing = JwtManager::new(JwtConfig::new("secret-one-for-testing-purposes-ok")).unwrap();
        let verifying =
            JwtManager::new(JwtConfig::new("secret-two-for-testing-purposes-ok")).unwrap();

        let token = issuing.issue(&Principal::new(1, Role::User)).unwrap();

        assert!(matches!(
            verifying.validate(&token),
            Err(AuthError::SignatureInvalid)
        ));
    }

    #[test]
    fn test_algorithm_confusion_rejected() {
        // Same secret, different HMAC algorithm: the pinned validation
        // must refuse the token.
        let hs256 = JwtManager::new(test_config()).unwrap();
        let hs512 =
            JwtManager::new(test_config().with_algorithm(Algorithm::HS512)).unwrap();

        let token = hs512.issue(&Principal::new(1, Role::User)).unwrap();

        assert!(matches!(
            hs256.validate(&token),
            Err(AuthError::SignatureInvalid)
        ));
    }

    #[test]
    fn test_refresh_token_is_not_a_session_credential() {
        let authority = manager();
        let principal = Principal::new(7, Role::User);

        let refresh = authority.issue_refresh(&principal).unwrap();

        assert!(authority.validate(&refresh).is_ok());
        assert!(authority.validate_principal(&refresh).is_err());
    }

    #[test]
    fn test_wrong_issuer_rejected() {
        let authority = manager();
        let other = JwtManager::new(test_config().with_issuer("someone-else")).unwrap();

        let token = other.issue(&Principal::new(1, Role::User)).unwrap();

        assert!(matches!(
            authority.validate(&token),
            Err(AuthError::SignatureInvalid)
        ));
    }

    #[test]
    fn test_config_serde_round_trip() {
        let json = serde_json::to_string(&test_config()).unwrap();
        let parsed: JwtConfig = serde_json::from_str(&json).unwrap();

        // The secret is never serialized.
        assert!(parsed.secret.is_empty());
        assert_eq!(parsed.algorithm, Algorithm::HS256);
    }
}
