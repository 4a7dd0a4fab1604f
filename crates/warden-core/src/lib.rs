// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # warden-core
//!
//! Core abstractions and shared types for the Warden authentication service.
//!
//! This crate provides the foundational pieces used across all Warden
//! components:
//!
//! - **Principal**: The authenticated identity (`Principal`, `Role`)
//! - **Error**: Unified authentication/authorization error hierarchy
//! - **Secure**: Password hashing and strength validation
//! - **Store**: Credential storage trait and in-memory implementation
//! - **Audit**: Security audit logging

#![warn(missing_docs)]
#![deny(unsafe_code)]

// =============================================================================
// Core Modules
// =============================================================================

pub mod error;
pub mod principal;

// =============================================================================
// Security Modules
// =============================================================================

pub mod audit;
pub mod secure;
pub mod store;

// =============================================================================
// Re-exports for convenience
// =============================================================================

pub use error::{AuthError, AuthResult};
pub use principal::{Principal, Role};

pub use secure::{Argon2Securer, PasswordSecurer};
pub use store::{CredentialStore, InMemoryCredentialStore, StoredCredential};

pub use audit::{
    ActionResult, AuditAction, AuditError, AuditLog, AuditLogger, AuditResult,
    InMemoryAuditLogger, NoOpAuditLogger,
};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");
