// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # warden-api
//!
//! HTTP authentication surface for Warden.
//!
//! This crate provides the token authority (JWT issuance/validation), the
//! role-based access policy, the session middleware that authenticates every
//! request, and the auth endpoints (login, refresh, logout, me,
//! change-password). Resource services are external: they consume the
//! [`Principal`](warden_core::Principal) attached by the session middleware
//! and call [`AccessPolicy::is_allowed`](auth::AccessPolicy::is_allowed)
//! before touching their data.

#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod auth;
pub mod config;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod response;
pub mod server;
pub mod state;

// Re-exports for convenience
pub use auth::{
    default_policy, AccessPolicy, AuthService, Claims, JwtConfig, JwtManager, LoginOutcome,
    PolicyBuilder, TokenKind,
};
pub use config::{ApiConfig, CorsConfig};
pub use error::{ApiError, ApiResult, ErrorResponseBody};
pub use extractors::{ClientIp, CurrentUser, OptionalUser, RequestId};
pub use middleware::{PolicyLayer, RequestContext, SessionLayer};
pub use response::{ApiResponse, AuthResponse, HealthResponse, PrincipalResponse};
pub use server::ApiServer;
pub use state::{AppState, AppStateBuilder};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
