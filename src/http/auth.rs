//! Login and token refresh handlers.

use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::auth::AuthError;
use crate::http::server::AppState;
use crate::observability::metrics;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: &'static str,
    /// Access-token lifetime in seconds.
    pub expires_in: i64,
}

/// Exchange username and password for a token pair.
///
/// Unknown users and wrong passwords produce the same response, so the
/// endpoint does not confirm which usernames exist. The bcrypt check runs
/// on a blocking thread; it is far too slow for the async executor.
pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(body): Json<LoginRequest>,
) -> Result<Json<TokenResponse>, AuthError> {
    let Some(user) = state.identity.find_by_username(&body.username) else {
        tracing::info!(username = %body.username, "Login attempt for unknown user");
        metrics::record_login(false);
        return Err(AuthError::InvalidCredentials);
    };

    let credentials = state.credentials.clone();
    let digest = user.password_digest.clone();
    let password = body.password;
    let verified = tokio::task::spawn_blocking(move || credentials.verify(&password, &digest))
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "Password verification task failed");
            AuthError::Internal
        })?;

    if !verified {
        tracing::info!(username = %body.username, "Login attempt with wrong password");
        metrics::record_login(false);
        return Err(AuthError::InvalidCredentials);
    }

    let access_token = state
        .tokens
        .issue_access(&user.subject, &user.role, &user.permissions)?;
    let refresh_token = state.tokens.issue_refresh(&user.subject, &user.role)?;

    tracing::info!(subject = %user.subject, role = %user.role, "Login succeeded");
    metrics::record_login(true);

    Ok(Json(TokenResponse {
        access_token,
        refresh_token,
        token_type: "bearer",
        expires_in: state.tokens.access_ttl_secs(),
    }))
}

/// Exchange a refresh token for a fresh token pair. Permissions are
/// re-derived from the role, not copied from the old token.
pub async fn refresh(
    State(state): State<Arc<AppState>>,
    Json(body): Json<RefreshRequest>,
) -> Result<Json<TokenResponse>, AuthError> {
    let claims = state.tokens.verify_refresh(&body.refresh_token)?;

    let access_token = state.tokens.issue_access(&claims.sub, &claims.role, &[])?;
    let refresh_token = state.tokens.issue_refresh(&claims.sub, &claims.role)?;

    tracing::debug!(subject = %claims.sub, "Token pair refreshed");

    Ok(Json(TokenResponse {
        access_token,
        refresh_token,
        token_type: "bearer",
        expires_in: state.tokens.access_ttl_secs(),
    }))
}
