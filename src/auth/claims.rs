//! Token claims carried by an authenticated principal.
//!
//! Claims are deserialized and validated exactly once, when the token is
//! verified; afterwards the principal is only ever this typed record, never
//! an untyped map. A principal lives for the duration of one request and is
//! never persisted.

use chrono::Utc;
use serde::{Deserialize, Serialize};

/// Token purpose for access tokens.
pub const PURPOSE_ACCESS: &str = "access";
/// Token purpose for refresh tokens.
pub const PURPOSE_REFRESH: &str = "refresh";

/// Decoded, validated identity and authorization data.
///
/// `sub` and `role` are mandatory: a token missing either fails
/// deserialization and is reported as malformed. `permissions` is an
/// explicit override; when empty, the effective set is derived from `role`
/// by the authorization policy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject - the user id.
    pub sub: String,

    /// Role name used for policy-derived permissions.
    pub role: String,

    /// Explicit permission grants; overrides role derivation when non-empty.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub permissions: Vec<String>,

    /// Issued at, Unix timestamp.
    pub iat: i64,

    /// Expiration, Unix timestamp.
    pub exp: i64,

    /// Unique token id.
    pub jti: String,

    /// Token purpose ("access" or "refresh").
    #[serde(skip_serializing_if = "Option::is_none")]
    pub purpose: Option<String>,
}

impl Claims {
    /// Strict expiry check: a token with `exp <= now` is never valid.
    pub fn is_expired(&self) -> bool {
        self.exp <= Utc::now().timestamp()
    }

    /// Whether the explicit permission claim contains `permission`.
    pub fn has_permission(&self, permission: &str) -> bool {
        self.permissions.iter().any(|p| p == permission)
    }

    /// Whether this token is a refresh token.
    pub fn is_refresh(&self) -> bool {
        self.purpose.as_deref() == Some(PURPOSE_REFRESH)
    }
}
