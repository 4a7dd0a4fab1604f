// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Session middleware.
//!
//! Intercepts every request, validates the bearer token via the token
//! authority, and attaches the resulting [`Principal`] to the request
//! extensions. Unauthenticated requests to protected paths short-circuit
//! here: downstream handlers never run.
//!
//! Every authentication failure produces the same 401 response. The precise
//! reason (malformed, expired, bad signature) is logged at debug level only,
//! so the response carries no oracle about why a token was rejected.

use std::collections::HashSet;
use std::future::Future;
use std::net::{IpAddr, SocketAddr};
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use axum::{
    body::Body,
    extract::ConnectInfo,
    http::{header, Request},
    response::{IntoResponse, Response},
};
use tower::{Layer, Service};
use uuid::Uuid;

use warden_core::Principal;

use crate::auth::JwtManager;
use crate::error::ApiError;

// =============================================================================
// RequestContext
// =============================================================================

/// Per-request metadata attached by the session middleware.
///
/// Present on every request, authenticated or not.
#[derive(Debug, Clone)]
pub struct RequestContext {
    /// Request ID for tracing.
    pub request_id: Uuid,
    /// Client IP address, when known.
    pub client_ip: Option<IpAddr>,
}

impl RequestContext {
    fn new(client_ip: Option<IpAddr>) -> Self {
        Self {
            request_id: Uuid::now_v7(),
            client_ip,
        }
    }
}

// =============================================================================
// SessionLayer
// =============================================================================

/// Layer for session authentication.
///
/// Wraps services so every request is authenticated before it reaches
/// business logic. Paths registered as public skip token validation.
#[derive(Clone)]
pub struct SessionLayer {
    jwt_manager: Arc<JwtManager>,
    public_paths: Arc<HashSet<String>>,
}

impl SessionLayer {
    /// Creates a new session layer.
    pub fn new(jwt_manager: Arc<JwtManager>) -> Self {
        Self {
            jwt_manager,
            public_paths: Arc::new(HashSet::new()),
        }
    }

    /// Adds public paths that don't require authentication.
    ///
    /// A trailing `*` matches by prefix.
    pub fn with_public_paths(mut self, paths: Vec<String>) -> Self {
        self.public_paths = Arc::new(paths.into_iter().collect());
        self
    }

    /// Creates with default public paths.
    pub fn with_default_public_paths(self) -> Self {
        self.with_public_paths(vec![
            "/health".to_string(),
            "/api/v1/auth/login".to_string(),
            "/api/v1/auth/refresh".to_string(),
        ])
    }
}

impl<S> Layer<S> for SessionLayer {
    type Service = SessionMiddleware<S>;

    fn layer(&self, inner: S) -> Self::Service {
        SessionMiddleware {
            inner,
            jwt_manager: self.jwt_manager.clone(),
            public_paths: self.public_paths.clone(),
        }
    }
}

// =============================================================================
// SessionMiddleware
// =============================================================================

/// Middleware for session authentication.
#[derive(Clone)]
pub struct SessionMiddleware<S> {
    inner: S,
    jwt_manager: Arc<JwtManager>,
    public_paths: Arc<HashSet<String>>,
}

impl<S> SessionMiddleware<S> {
    /// Checks if a path is public.
    fn is_public_path(&self, path: &str) -> bool {
        if self.public_paths.contains(path) {
            return true;
        }

        for public_path in self.public_paths.iter() {
            if let Some(prefix) = public_path.strip_suffix('*') {
                if path.starts_with(prefix) {
                    return true;
                }
            }
        }

        false
    }
}

impl<S> Service<Request<Body>> for SessionMiddleware<S>
where
    S: Service<Request<Body>, Response = Response> + Clone + Send + 'static,
    S::Future: Send + 'static,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut req: Request<Body>) -> Self::Future {
        let jwt_manager = self.jwt_manager.clone();
        let is_public = self.is_public_path(req.uri().path());
        let mut inner = self.inner.clone();

        Box::pin(async move {
            let client_ip = req
                .extensions()
                .get::<ConnectInfo<SocketAddr>>()
                .map(|ci| ci.0.ip());

            req.extensions_mut().insert(RequestContext::new(client_ip));

            if is_public {
                return inner.call(req).await;
            }

            let Some(token) = extract_bearer_token(&req) else {
                tracing::debug!("No authorization token provided");
                return Ok(unauthenticated_response());
            };

            let principal = match jwt_manager.validate_principal(&token) {
                Ok(principal) => principal,
                Err(e) => {
                    // The sub-reason stays in the log; the response is uniform.
                    tracing::debug!(error_code = e.error_code(), "Token validation failed");
                    return Ok(unauthenticated_response());
                }
            };

            req.extensions_mut().insert(principal);

            inner.call(req).await
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Extracts the bearer token from the Authorization header.
fn extract_bearer_token<B>(req: &Request<B>) -> Option<String> {
    req.headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer ").map(|s| s.to_string()))
}

/// The single response every authentication failure maps to.
fn unauthenticated_response() -> Response {
    ApiError::unauthorized("Authentication required").into_response()
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::JwtConfig;
    use axum::http::{HeaderValue, StatusCode};
    use tower::ServiceExt;
    use warden_core::Role;

    fn jwt() -> Arc<JwtManager> {
        Arc::new(
            JwtManager::new(JwtConfig::new(
                "test-secret-key-that-is-long-enough-for-testing",
            ))
            .unwrap(),
        )
    }

    fn echo_principal_service() -> impl Service<
        Request<Body>,
        Response = Response,
        Error = std::convert::Infallible,
        Future = impl Future<Output = Result<Response, std::convert::Infallible>> + Send,
    > + Clone
           + Send {
        tower::service_fn(|req: Request<Body>| async move {
            let authenticated = req.extensions().get::<Principal>().is_some();
            let status = if authenticated {
                StatusCode::OK
            } else {
                StatusCode::NO_CONTENT
            };
            Ok::<_, std::convert::Infallible>(status.into_response())
        })
    }

    #[test]
    fn test_extract_bearer_token() {
        let mut req = Request::builder().uri("/test").body(Body::empty()).unwrap();

        assert!(extract_bearer_token(&req).is_none());

        req.headers_mut()
            .insert(header::AUTHORIZATION, HeaderValue::from_static("Basic abc"));
        assert!(extract_bearer_token(&req).is_none());

        req.headers_mut().insert(
            header::AUTHORIZATION,
            HeaderValue::from_static("Bearer mytoken123"),
        );
        assert_eq!(extract_bearer_token(&req), Some("mytoken123".to_string()));
    }

    #[test]
    fn test_public_paths() {
        let layer = SessionLayer::new(jwt())
            .with_public_paths(vec!["/health".to_string(), "/public/*".to_string()]);

        let middleware = layer.layer(tower::service_fn(|_req: Request<Body>| async {
            Ok::<_, std::convert::Infallible>(Response::new(Body::empty()))
        }));

        assert!(middleware.is_public_path("/health"));
        assert!(middleware.is_public_path("/public/anything"));
        assert!(!middleware.is_public_path("/private"));
    }

    #[tokio::test]
    async fn test_valid_token_attaches_principal() {
        let jwt = jwt();
        let token = jwt.issue(&Principal::new(7, Role::User)).unwrap();
        let mut service = SessionLayer::new(jwt).layer(echo_principal_service());

        let req = Request::builder()
            .uri("/protected")
            .header(header::AUTHORIZATION, format!("Bearer {}", token))
            .body(Body::empty())
            .unwrap();

        let response = service.ready().await.unwrap().call(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_missing_token_short_circuits() {
        let mut service = SessionLayer::new(jwt()).layer(echo_principal_service());

        let req = Request::builder()
            .uri("/protected")
            .body(Body::empty())
            .unwrap();

        let response = service.ready().await.unwrap().call(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_expired_and_garbage_tokens_get_identical_responses() {
        use crate::auth::Claims;
        use axum::body::to_bytes;

        let jwt = jwt();
        let expired_claims = Claims::new(&Principal::new(7, Role::User), -3600).with_issuer("warden");
        let expired = jwt.sign(&expired_claims).unwrap();

        let mut service = SessionLayer::new(jwt).layer(echo_principal_service());

        let mut bodies = Vec::new();
        for token in [expired.as_str(), "garbage"] {
            let req = Request::builder()
                .uri("/protected")
                .header(header::AUTHORIZATION, format!("Bearer {}", token))
                .body(Body::empty())
                .unwrap();

            let response = service.ready().await.unwrap().call(req).await.unwrap();
            assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
            let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
            bodies.push(body);
        }

        // No oracle: the caller cannot tell expired from malformed.
        assert_eq!(bodies[0], bodies[1]);
    }

    #[tokio::test]
    async fn test_public_path_skips_validation() {
        let mut service = SessionLayer::new(jwt())
            .with_default_public_paths()
            .layer(echo_principal_service());

        let req = Request::builder()
            .uri("/health")
            .body(Body::empty())
            .unwrap();

        let response = service.ready().await.unwrap().call(req).await.unwrap();
        // Reached the inner service without a principal.
        assert_eq!(response.status(), StatusCode::NO_CONTENT);
    }

    #[tokio::test]
    async fn test_refresh_token_rejected_as_session_credential() {
        let jwt = jwt();
        let refresh = jwt.issue_refresh(&Principal::new(7, Role::User)).unwrap();
        let mut service = SessionLayer::new(jwt).layer(echo_principal_service());

        let req = Request::builder()
            .uri("/protected")
            .header(header::AUTHORIZATION, format!("Bearer {}", refresh))
            .body(Body::empty())
            .unwrap();

        let response = service.ready().await.unwrap().call(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
}
