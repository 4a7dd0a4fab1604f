// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Role-based access policy.
//!
//! The policy is a deny-by-default table: a `(role, resource, action)`
//! triple is allowed only if an explicit entry says so, or if the pair
//! `(resource, action)` carries an owner override and the caller owns the
//! target record. Role hierarchy is declared on the builder and flattened
//! into concrete entries at build time; `is_allowed` is plain map lookups.
//!
//! The policy is built once at startup and shared immutably across all call
//! handlers.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use warden_core::{Principal, Role};

// =============================================================================
// AccessPolicy
// =============================================================================

/// Immutable access policy table.
#[derive(Debug, Clone)]
pub struct AccessPolicy {
    /// role -> resource -> allowed actions.
    rules: Arc<HashMap<Role, HashMap<String, HashSet<String>>>>,
    /// resource -> actions satisfiable by ownership alone.
    owner_overrides: Arc<HashMap<String, HashSet<String>>>,
}

impl AccessPolicy {
    /// Creates a policy builder.
    pub fn builder() -> PolicyBuilder {
        PolicyBuilder::new()
    }

    /// Returns `true` if the role's table grants the action on the resource.
    pub fn role_can(&self, role: Role, resource: &str, action: &str) -> bool {
        self.rules
            .get(&role)
            .and_then(|by_resource| by_resource.get(resource))
            .is_some_and(|actions| actions.contains(action))
    }

    /// Returns `true` if ownership alone satisfies the action on the resource.
    pub fn has_owner_override(&self, resource: &str, action: &str) -> bool {
        self.owner_overrides
            .get(resource)
            .is_some_and(|actions| actions.contains(action))
    }

    /// Decides whether a principal may perform an action on a resource.
    ///
    /// `owner_id` is the owner of the specific target record, when the caller
    /// has one. Absent table entry and absent (or non-matching) ownership
    /// means deny.
    pub fn is_allowed(
        &self,
        principal: &Principal,
        action: &str,
        resource: &str,
        owner_id: Option<i64>,
    ) -> bool {
        if self.role_can(principal.role, resource, action) {
            return true;
        }

        match owner_id {
            Some(owner) => self.has_owner_override(resource, action) && principal.owns(owner),
            None => false,
        }
    }
}

impl Default for AccessPolicy {
    fn default() -> Self {
        default_policy()
    }
}

// =============================================================================
// PolicyBuilder
// =============================================================================

/// Builder for constructing access policies.
#[derive(Debug, Default)]
pub struct PolicyBuilder {
    allows: Vec<(Role, String, String)>,
    owner_overrides: Vec<(String, String)>,
    implies: HashMap<Role, Vec<Role>>,
}

impl PolicyBuilder {
    /// Creates a new builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Grants an action on a resource to a role.
    pub fn allow(
        mut self,
        role: Role,
        resource: impl Into<String>,
        action: impl Into<String>,
    ) -> Self {
        self.allows.push((role, resource.into(), action.into()));
        self
    }

    /// Marks an action on a resource as satisfiable by ownership alone.
    pub fn owner_override(
        mut self,
        resource: impl Into<String>,
        action: impl Into<String>,
    ) -> Self {
        self.owner_overrides
            .push((resource.into(), action.into()));
        self
    }

    /// Declares that `role` inherits every grant of `lower`.
    ///
    /// The relation is resolved transitively when the policy is built; the
    /// finished table holds concrete entries only.
    pub fn implies(mut self, role: Role, lower: Role) -> Self {
        self.implies.entry(role).or_default().push(lower);
        self
    }

    /// Builds the flattened, immutable policy.
    pub fn build(self) -> AccessPolicy {
        let mut rules: HashMap<Role, HashMap<String, HashSet<String>>> = HashMap::new();

        for (role, resource, action) in &self.allows {
            rules
                .entry(*role)
                .or_default()
                .entry(resource.clone())
                .or_default()
                .insert(action.clone());
        }

        // Flatten the implies relation: each role absorbs the entries of
        // every role transitively below it.
        for role in Role::all() {
            for lower in self.closure(*role) {
                let Some(inherited) = rules.get(&lower).cloned() else {
                    continue;
                };
                let own = rules.entry(*role).or_default();
                for (resource, actions) in inherited {
                    own.entry(resource).or_default().extend(actions);
                }
            }
        }

        let mut owner_overrides: HashMap<String, HashSet<String>> = HashMap::new();
        for (resource, action) in self.owner_overrides {
            owner_overrides.entry(resource).or_default().insert(action);
        }

        AccessPolicy {
            rules: Arc::new(rules),
            owner_overrides: Arc::new(owner_overrides),
        }
    }

    /// Returns every role transitively implied by `role`, excluding itself.
    fn closure(&self, role: Role) -> Vec<Role> {
        let mut seen = HashSet::new();
        let mut stack: Vec<Role> = self.implies.get(&role).cloned().unwrap_or_default();

        while let Some(lower) = stack.pop() {
            if lower == role || !seen.insert(lower) {
                continue;
            }
            if let Some(next) = self.implies.get(&lower) {
                stack.extend(next.iter().copied());
            }
        }

        seen.into_iter().collect()
    }
}

// =============================================================================
// Default Policy
// =============================================================================

/// The shipped policy for the users/events domain.
///
/// - `user`: create and browse events; own records reachable via overrides
/// - `admin`: everything a user can, plus user management and any event
/// - `superadmin`: everything an admin can, plus account provisioning
pub fn default_policy() -> AccessPolicy {
    AccessPolicy::builder()
        .allow(Role::User, "event", "create")
        .allow(Role::User, "event", "view")
        .allow(Role::User, "event", "list")
        .allow(Role::Admin, "user", "view")
        .allow(Role::Admin, "user", "list")
        .allow(Role::Admin, "user", "update")
        .allow(Role::Admin, "event", "update")
        .allow(Role::Admin, "event", "delete")
        .allow(Role::Superadmin, "user", "create")
        .allow(Role::Superadmin, "user", "delete")
        .implies(Role::Admin, Role::User)
        .implies(Role::Superadmin, Role::Admin)
        .owner_override("event", "update")
        .owner_override("event", "delete")
        .owner_override("user", "view")
        .owner_override("user", "update")
        .build()
}

// =============================================================================
// Tests
// =============================================================================
