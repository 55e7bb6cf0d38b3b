//! Role-based authorization.
//!
//! A static, process-wide role → permission table, loaded once. An explicit
//! non-empty `permissions` claim on the token takes precedence over the
//! role-derived set; an unknown role maps to the empty set, so there is no
//! implicit elevation.

use std::collections::{BTreeSet, HashMap};

use axum::http::Method;

use crate::auth::claims::Claims;
use crate::auth::error::AuthError;
use crate::config::RoutePermission;

/// Immutable role → permission mapping.
#[derive(Debug, Clone)]
pub struct AuthorizationPolicy {
    table: HashMap<String, BTreeSet<String>>,
}

impl Default for AuthorizationPolicy {
    /// Built-in ERP policy: viewer ⊆ user ⊆ admin.
    fn default() -> Self {
        let viewer: BTreeSet<String> = ["users:read", "orders:read", "stock:read"]
            .into_iter()
            .map(String::from)
            .collect();

        let mut user = viewer.clone();
        user.extend(["orders:write", "stock:write"].into_iter().map(String::from));

        let mut admin = user.clone();
        admin.extend(["users:write", "admin:manage"].into_iter().map(String::from));

        let mut table = HashMap::new();
        table.insert("viewer".to_string(), viewer);
        table.insert("user".to_string(), user);
        table.insert("admin".to_string(), admin);
        Self { table }
    }
}

impl AuthorizationPolicy {
    /// Build from an externally supplied table; an empty table falls back
    /// to the built-in default.
    pub fn from_table(table: HashMap<String, Vec<String>>) -> Self {
        if table.is_empty() {
            return Self::default();
        }
        Self {
            table: table
                .into_iter()
                .map(|(role, perms)| (role, perms.into_iter().collect()))
                .collect(),
        }
    }

    /// Permission set for a role; empty for unknown roles.
    pub fn permissions_for(&self, role: &str) -> BTreeSet<String> {
        self.table.get(role).cloned().unwrap_or_default()
    }

    /// Allow iff the principal's effective permission set contains
    /// `required`. The token's own claim wins over role derivation.
    pub fn authorize(&self, claims: &Claims, required: &str) -> Result<(), AuthError> {
        let allowed = if claims.permissions.is_empty() {
            self.table
                .get(&claims.role)
                .is_some_and(|perms| perms.contains(required))
        } else {
            claims.has_permission(required)
        };

        if allowed {
            Ok(())
        } else {
            Err(AuthError::InsufficientPermission)
        }
    }
}

/// Route → required-permission lookup. First matching prefix wins.
#[derive(Debug, Clone, Default)]
pub struct RoutePermissions {
    rules: Vec<RoutePermission>,
}

impl RoutePermissions {
    pub fn new(rules: Vec<RoutePermission>) -> Self {
        Self { rules }
    }

    /// The permission a request must hold, if the route demands one.
    pub fn required_permission(&self, method: &Method, path: &str) -> Option<&str> {
        self.rules
            .iter()
            .find(|rule| {
                path.starts_with(&rule.prefix)
                    && (rule.methods.is_empty()
                        || rule
                            .methods
                            .iter()
                            .any(|m| m.eq_ignore_ascii_case(method.as_str())))
            })
            .map(|rule| rule.permission.as_str())
    }
}
