//! Shared fixtures for integration tests.

use std::sync::Arc;

use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use http_body_util::BodyExt;
use serde_json::{json, Value};

use erp_gateway::auth::{CredentialStore, InMemoryIdentityStore, TokenService, UserRecord};
use erp_gateway::{GatewayConfig, GatewayServer};

pub const TEST_SECRET: &str = "integration-test-secret";
pub const ALICE_PASSWORD: &str = "alice-password";

/// Config with a known secret and a configurable window limit.
pub fn test_config(rate_limit: u32) -> GatewayConfig {
    let mut config = GatewayConfig::default();
    config.jwt.secret = TEST_SECRET.to_string();
    config.rate_limit.default_limit = rate_limit;
    config.rate_limit.burst_limit = rate_limit;
    config
}

/// Identity store with one admin and one viewer, hashed at minimum cost to
/// keep the suite fast.
pub fn seeded_identity() -> Arc<InMemoryIdentityStore> {
    let credentials = CredentialStore::new(4);
    Arc::new(InMemoryIdentityStore::new(vec![
        UserRecord {
            subject: "user-alice".to_string(),
            username: "alice".to_string(),
            role: "admin".to_string(),
            password_digest: credentials.hash(ALICE_PASSWORD).unwrap(),
            permissions: vec![],
        },
        UserRecord {
            subject: "user-bob".to_string(),
            username: "bob".to_string(),
            role: "viewer".to_string(),
            password_digest: credentials.hash("bob-password").unwrap(),
            permissions: vec![],
        },
    ]))
}

/// Business routes sitting behind the gateway in tests.
pub fn business_router() -> Router {
    Router::new()
        .route("/api/orders", get(list_orders).post(create_order))
        .route("/api/boom", get(boom))
}

async fn list_orders() -> Json<Value> {
    Json(json!({ "orders": [] }))
}

async fn create_order() -> (StatusCode, Json<Value>) {
    (StatusCode::CREATED, Json(json!({ "id": 1 })))
}

async fn boom() -> Json<Value> {
    panic!("handler blew up");
}

/// Full gateway app over the test business routes.
pub fn build_app(config: GatewayConfig) -> Router {
    GatewayServer::new(config, seeded_identity())
        .unwrap()
        .router(business_router())
}

/// Token service sharing the test signing secret, for minting tokens
/// without going through the login endpoint.
pub fn token_service(config: &GatewayConfig) -> TokenService {
    TokenService::new(&config.jwt).unwrap()
}

pub fn bearer(token: &str) -> String {
    format!("Bearer {token}")
}

pub async fn body_json(response: axum::response::Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}
