//! Gateway configuration.
//!
//! # Responsibilities
//! - Define the TOML schema with complete defaults (`schema`)
//! - Load file + environment layers in a fixed precedence (`loader`)
//! - Reject configs that parse but cannot run (`validation`)
//!
//! Configuration is read once at startup and treated as immutable; there is
//! no hot reload.

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{default_config, load_config};
pub use schema::{
    AuthPathsConfig, AuthorizationConfig, GatewayConfig, HeaderConfig, IdentityConfig,
    JwtConfig, ListenerConfig, ObservabilityConfig, RateLimitConfig, RateLimitOverride,
    RoutePermission, TimeoutConfig, UserEntry,
};
pub use validation::{validate, ConfigError, ValidationError};
