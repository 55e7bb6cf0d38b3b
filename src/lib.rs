//! ERP API gateway: request authentication and admission control.
//!
//! Every inbound request passes a fixed chain before reaching a handler:
//! header hygiene, per-client rate limiting, token verification, and
//! role-based route authorization. Rejections share one status taxonomy
//! and one `{"detail": ...}` body shape.

pub mod auth;
pub mod config;
pub mod http;
pub mod observability;
pub mod pipeline;
pub mod security;

pub use auth::{AuthError, Claims, IdentityStore, InMemoryIdentityStore, TokenService};
pub use config::GatewayConfig;
pub use http::GatewayServer;
pub use pipeline::RequestPipeline;
pub use security::SlidingWindowLimiter;
