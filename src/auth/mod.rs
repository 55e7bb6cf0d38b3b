//! Authentication and authorization core.
//!
//! # Responsibilities
//! - Issue and verify signed credential tokens (`token`, `claims`)
//! - Hash and verify passwords (`password`)
//! - Resolve users at login time (`identity`)
//! - Map roles and explicit grants to permissions (`policy`)
//! - Define the single rejection taxonomy (`error`)
//!
//! # Design Decisions
//! - One error enum covers every admission failure, so status codes and
//!   response bodies stay consistent across middleware and handlers.
//! - Token verification is stateless; no revocation list, no session store.
//! - Permission checks read a static table built once at startup.

pub mod claims;
pub mod error;
pub mod identity;
pub mod password;
pub mod policy;
pub mod token;

pub use claims::Claims;
pub use error::AuthError;
pub use identity::{IdentityStore, InMemoryIdentityStore, UserRecord};
pub use password::CredentialStore;
pub use policy::{AuthorizationPolicy, RoutePermissions};
pub use token::TokenService;
