// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Access policy middleware.
//!
//! Enforces a fixed `(resource, action)` pair for a route. Owner-aware
//! decisions cannot happen here (the middleware has not loaded the target
//! record), so resource handlers make those calls against
//! [`AccessPolicy::is_allowed`] directly; this layer covers the routes whose
//! requirement is role-only.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use axum::{
    body::Body,
    http::Request,
    response::{IntoResponse, Response},
};
use tower::{Layer, Service};

use warden_core::Principal;

use crate::auth::AccessPolicy;
use crate::error::ApiError;

// =============================================================================
// PolicyLayer
// =============================================================================

/// Layer enforcing an access policy requirement on a route.
#[derive(Clone)]
pub struct PolicyLayer {
    policy: Arc<AccessPolicy>,
    resource: &'static str,
    action: &'static str,
}

impl PolicyLayer {
    /// Creates a layer requiring `action` on `resource`.
    pub fn require(policy: Arc<AccessPolicy>, resource: &'static str, action: &'static str) -> Self {
        Self {
            policy,
            resource,
            action,
        }
    }
}

impl<S> Layer<S> for PolicyLayer {
    type Service = PolicyMiddleware<S>;

    fn layer(&self, inner: S) -> Self::Service {
        PolicyMiddleware {
            inner,
            policy: self.policy.clone(),
            resource: self.resource,
            action: self.action,
        }
    }
}

// =============================================================================
// PolicyMiddleware
// =============================================================================

/// Middleware for access policy enforcement.
#[derive(Clone)]
pub struct PolicyMiddleware<S> {
    inner: S,
    policy: Arc<AccessPolicy>,
    resource: &'static str,
    action: &'static str,
}

impl<S> Service<Request<Body>> for PolicyMiddleware<S>
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

    fn call(&mut self, req: Request<Body>) -> Self::Future {
        let policy = self.policy.clone();
        let resource = self.resource;
        let action = self.action;
        let mut inner = self.inner.clone();

        Box::pin(async move {
            let Some(principal) = req.extensions().get::<Principal>().copied() else {
                tracing::warn!("No principal found, denying access");
                return Ok(ApiError::unauthorized("Authentication required").into_response());
            };

            if !policy.is_allowed(&principal, action, resource, None) {
                tracing::warn!(
                    user_id = principal.id,
                    role = %principal.role,
                    resource,
                    action,
                    "Permission denied"
                );
                return Ok(ApiError::forbidden("Insufficient permissions").into_response());
            }

            inner.call(req).await
        })
    }
}

// =============================================================================
// Tests
// =============================================================================
