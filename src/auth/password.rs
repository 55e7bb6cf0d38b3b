//! One-way password hashing with bcrypt.
//!
//! Hashing is deliberately slow (cost factor from config, default 12) and
//! purely CPU-bound. Callers on a latency-sensitive path must move it to a
//! blocking thread; see the login handler.

use crate::auth::error::AuthError;

/// Default bcrypt cost factor.
pub const DEFAULT_COST: u32 = 12;

/// Stateless password hashing and verification.
#[derive(Debug, Clone)]
pub struct CredentialStore {
    cost: u32,
}

impl Default for CredentialStore {
    fn default() -> Self {
        Self { cost: DEFAULT_COST }
    }
}

impl CredentialStore {
    pub fn new(cost: u32) -> Self {
        Self { cost }
    }

    /// Hash a password. Each call salts independently, so equal passwords
    /// produce distinct digests.
    pub fn hash(&self, password: &str) -> Result<String, AuthError> {
        bcrypt::hash(password, self.cost).map_err(|e| {
            tracing::error!(error = %e, "Password hashing failed");
            AuthError::Internal
        })
    }

    /// Verify a password against a digest. Returns false on mismatch and on
    /// an unparseable digest; there is no error path for the caller.
    pub fn verify(&self, password: &str, digest: &str) -> bool {
        bcrypt::verify(password, digest).unwrap_or(false)
    }
}
