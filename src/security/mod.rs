//! Request hygiene and abuse protection.
//!
//! # Responsibilities
//! - Lint inbound credential headers before any verification (`headers`)
//! - Enforce per-client, per-route sliding-window limits (`rate_limit`)
//! - Stamp hardening headers onto every response (`response_headers`)

pub mod headers;
pub mod rate_limit;
pub mod response_headers;

pub use headers::{AuthRequirement, HeaderValidator};
pub use rate_limit::{
    resolve_client_identity, spawn_sweeper, RateLimitStatus, SlidingWindowLimiter,
};
pub use response_headers::security_headers;
