//! Identity store collaborator.
//!
//! The gateway does not own user persistence; it consumes a narrow lookup
//! contract. The in-memory implementation backs tests and config-seeded
//! deployments; a database-backed store plugs in behind the same trait.

use std::collections::HashMap;

use crate::config::IdentityConfig;

/// The subset of a user record the admission path needs.
#[derive(Debug, Clone)]
pub struct UserRecord {
    /// Stable subject id embedded in issued tokens.
    pub subject: String,
    pub username: String,
    pub role: String,
    /// bcrypt digest; never a plaintext password.
    pub password_digest: String,
    /// Explicit permission grants; empty means role-derived.
    pub permissions: Vec<String>,
}

/// Lookup contract consumed by the login handler.
pub trait IdentityStore: Send + Sync {
    fn find_by_username(&self, username: &str) -> Option<UserRecord>;
}

/// In-memory store keyed by username.
#[derive(Debug, Default)]
pub struct InMemoryIdentityStore {
    users: HashMap<String, UserRecord>,
}

impl InMemoryIdentityStore {
    pub fn new(users: Vec<UserRecord>) -> Self {
        Self {
            users: users
                .into_iter()
                .map(|u| (u.username.clone(), u))
                .collect(),
        }
    }

    /// Seed from the optional `[identity]` config section.
    pub fn from_config(config: &IdentityConfig) -> Self {
        Self::new(
            config
                .users
                .iter()
                .map(|u| UserRecord {
                    subject: u.subject.clone(),
                    username: u.username.clone(),
                    role: u.role.clone(),
                    password_digest: u.password_digest.clone(),
                    permissions: u.permissions.clone(),
                })
                .collect(),
        )
    }

    pub fn insert(&mut self, user: UserRecord) {
        self.users.insert(user.username.clone(), user);
    }
}

impl IdentityStore for InMemoryIdentityStore {
    fn find_by_username(&self, username: &str) -> Option<UserRecord> {
        self.users.get(username).cloned()
    }
}
