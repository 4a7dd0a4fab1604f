// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Authenticated identity types.

use serde::{Deserialize, Serialize};

// =============================================================================
// Role
// =============================================================================

/// Access roles.
///
/// Roles are unordered; what a role may do is defined entirely by the access
/// policy table. The shipped policy grants `Superadmin` everything `Admin`
/// has and `Admin` everything `User` has, but that relation is declared in
/// the policy, not here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Regular account. Owns its record and the resources it created.
    User,
    /// Manages users and resources across accounts.
    Admin,
    /// Complete system access, including account provisioning.
    Superadmin,
}

impl Role {
    /// Returns the role name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Admin => "admin",
            Role::Superadmin => "superadmin",
        }
    }

    /// Parses a role from a string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "user" => Some(Role::User),
            "admin" | "administrator" => Some(Role::Admin),
            "superadmin" | "super_admin" | "root" => Some(Role::Superadmin),
            _ => None,
        }
    }

    /// Returns all defined roles.
    pub fn all() -> &'static [Role] {
        &[Role::User, Role::Admin, Role::Superadmin]
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// =============================================================================
// Principal
// =============================================================================

/// The authenticated identity attached to a call.
///
/// A principal is derived from a validated token, constructed per call, and
/// discarded when the call completes. It is never persisted by the core.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    /// User ID.
    pub id: i64,
    /// Role carried by the session token.
    pub role: Role,
}

impl Principal {
    /// Creates a new principal.
    pub fn new(id: i64, role: Role) -> Self {
        Self { id, role }
    }

    /// Returns `true` if this principal owns the given record.
    pub fn owns(&self, owner_id: i64) -> bool {
        self.id == owner_id
    }
}

impl std::fmt::Display for Principal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}({})", self.role, self.id)
    }
}

// =============================================================================
// Tests
// =============================================================================
