//! Admission failure taxonomy.
//!
//! Every stage of the pipeline resolves its own failures into one of these
//! variants. The protocol mapping (status code, `{"detail": ...}` body)
//! happens only at the boundary via `IntoResponse`; internally the variants
//! stay distinguishable even where the wire normalizes them to 401.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Reasons a request can be rejected before reaching business logic.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    // Header validation failures
    /// No `Authorization` header on a path that requires one.
    #[error("Missing authorization token")]
    MissingToken,

    /// `Authorization` header does not match `Bearer <token>`.
    #[error("Invalid authorization header format")]
    InvalidFormat,

    /// Bearer prefix present but the token is all whitespace.
    #[error("Empty bearer token")]
    EmptyToken,

    /// Token shorter than the configured minimum length.
    #[error("Bearer token is too short")]
    TooShort,

    /// Token longer than the configured maximum length.
    #[error("Bearer token is too long")]
    TooLong,

    /// Token contains characters outside the base64url-ish allowed set.
    #[error("Bearer token contains invalid characters")]
    InvalidChars,

    // Token verification failures
    /// Token `exp` is not in the future.
    #[error("Token has expired")]
    Expired,

    /// Signature check failed.
    #[error("Invalid token signature")]
    InvalidSignature,

    /// Token structure or claims could not be parsed.
    #[error("Malformed token: {0}")]
    Malformed(String),

    /// Login credentials did not match.
    #[error("Invalid username or password")]
    InvalidCredentials,

    // Authorization failure
    /// Authenticated principal lacks the permission the route requires.
    #[error("Insufficient permissions")]
    InsufficientPermission,

    // Admission control failure
    /// Sliding-window budget exhausted for this client and route.
    #[error("Rate limit exceeded")]
    RateLimited,

    // Request shape failure
    /// Mutating request without an `application/json` Content-Type.
    #[error("Content-Type must be application/json")]
    InvalidContentType,

    /// Anything unexpected. Detail is logged server-side, never surfaced.
    #[error("Internal server error")]
    Internal,
}

impl AuthError {
    /// Wire-level status for this rejection.
    pub fn status(&self) -> StatusCode {
        match self {
            AuthError::MissingToken
            | AuthError::InvalidFormat
            | AuthError::EmptyToken
            | AuthError::TooShort
            | AuthError::TooLong
            | AuthError::InvalidChars
            | AuthError::Expired
            | AuthError::InvalidSignature
            | AuthError::Malformed(_)
            | AuthError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            AuthError::InsufficientPermission => StatusCode::FORBIDDEN,
            AuthError::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            AuthError::InvalidContentType => StatusCode::BAD_REQUEST,
            AuthError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Stable label for metrics and structured logs.
    pub fn kind(&self) -> &'static str {
        match self {
            AuthError::MissingToken => "missing_token",
            AuthError::InvalidFormat => "invalid_format",
            AuthError::EmptyToken => "empty_token",
            AuthError::TooShort => "too_short",
            AuthError::TooLong => "too_long",
            AuthError::InvalidChars => "invalid_chars",
            AuthError::Expired => "expired",
            AuthError::InvalidSignature => "invalid_signature",
            AuthError::Malformed(_) => "malformed",
            AuthError::InvalidCredentials => "invalid_credentials",
            AuthError::InsufficientPermission => "insufficient_permission",
            AuthError::RateLimited => "rate_limited",
            AuthError::InvalidContentType => "invalid_content_type",
            AuthError::Internal => "internal",
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let status = self.status();
        // Internal detail never reaches the caller.
        let detail = match self {
            AuthError::Internal => "Internal server error".to_string(),
            ref other => other.to_string(),
        };
        (status, Json(json!({ "detail": detail }))).into_response()
    }
}
