//! Gateway server assembly.
//!
//! # Responsibilities
//! - Build the shared application state from config
//! - Assemble the router with the middleware stack in a fixed order
//! - Serve with graceful shutdown and the limiter sweeper running
//!
//! # Design Decisions
//! - The admission middleware sits innermost so every other layer (panic
//!   recovery, security headers, timeout, tracing) also covers rejections.
//! - Business routes are merged in by the caller; the gateway owns only
//!   auth endpoints and health.

use std::any::Any;
use std::sync::Arc;
use std::time::Duration;

use axum::extract::State;
use axum::http::StatusCode;
use axum::middleware;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::json;
use tokio::net::TcpListener;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::auth::{AuthError, CredentialStore, IdentityStore, TokenService};
use crate::config::GatewayConfig;
use crate::http::auth;
use crate::pipeline::{admission_middleware, RequestPipeline};
use crate::security::{security_headers, spawn_sweeper, SlidingWindowLimiter};

/// Shared state for handlers and middleware.
pub struct AppState {
    pub config: GatewayConfig,
    pub tokens: Arc<TokenService>,
    pub limiter: Arc<SlidingWindowLimiter>,
    pub identity: Arc<dyn IdentityStore>,
    pub credentials: CredentialStore,
}

pub struct GatewayServer {
    state: Arc<AppState>,
    pipeline: Arc<RequestPipeline>,
}

impl GatewayServer {
    pub fn new(
        config: GatewayConfig,
        identity: Arc<dyn IdentityStore>,
    ) -> Result<Self, AuthError> {
        let tokens = Arc::new(TokenService::new(&config.jwt)?);
        let limiter = Arc::new(SlidingWindowLimiter::new(config.rate_limit.clone()));
        let pipeline = Arc::new(RequestPipeline::new(
            &config,
            tokens.clone(),
            limiter.clone(),
        ));

        Ok(Self {
            state: Arc::new(AppState {
                config,
                tokens,
                limiter,
                identity,
                credentials: CredentialStore::default(),
            }),
            pipeline,
        })
    }

    /// Assemble the full router: gateway routes, the caller's business
    /// routes, and the middleware stack.
    pub fn router(&self, api: Router<()>) -> Router<()> {
        let gateway = Router::new()
            .route("/health", get(health))
            .route("/api/auth/login", post(auth::login))
            .route("/api/auth/refresh", post(auth::refresh))
            .with_state(self.state.clone());

        gateway
            .merge(api)
            .layer(middleware::from_fn_with_state(
                self.pipeline.clone(),
                admission_middleware,
            ))
            .layer(CatchPanicLayer::custom(handle_panic))
            .layer(TimeoutLayer::new(Duration::from_secs(
                self.state.config.timeouts.request_secs,
            )))
            .layer(middleware::from_fn(security_headers))
            .layer(TraceLayer::new_for_http())
    }

    /// Serve until ctrl-c. Spawns the limiter sweeper alongside.
    pub async fn run(self, listener: TcpListener, api: Router<()>) -> std::io::Result<()> {
        spawn_sweeper(
            self.state.limiter.clone(),
            self.state.config.rate_limit.sweep_interval_seconds,
        );

        let app = self
            .router(api)
            .into_make_service_with_connect_info::<std::net::SocketAddr>();

        tracing::info!(address = %listener.local_addr()?, "Gateway listening");
        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await
    }
}

async fn health(State(_state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

/// Convert handler panics into the uniform 500 body instead of a dropped
/// connection.
fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = err
        .downcast_ref::<&str>()
        .map(|s| s.to_string())
        .or_else(|| err.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic".to_string());
    tracing::error!(panic = %detail, "Handler panicked");

    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "detail": AuthError::Internal.to_string() })),
    )
        .into_response()
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        return;
    }
    tracing::info!("Shutdown signal received");
}
