//! HTTP surface: server assembly and gateway-owned endpoints.

pub mod auth;
pub mod server;

pub use server::{AppState, GatewayServer};
