//! Request admission pipeline.
//!
//! # Responsibilities
//! - Run the fixed admission chain: header hygiene, rate limiting, token
//!   verification, route authorization
//! - Short-circuit deterministically on the first failing stage
//! - Expose the chain as an axum middleware that attaches the verified
//!   principal to admitted requests
//!
//! # Design Decisions
//! - The chain is ordered cheapest-first: a malformed header never costs a
//!   signature check, and a rate-limited client never costs one either.
//! - Rate-limit headers are attached whenever the limiter stage ran, on
//!   both admissions and rejections, so clients can pace themselves.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::{ConnectInfo, Request, State};
use axum::http::{HeaderMap, HeaderValue, Method};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};

use crate::auth::{AuthError, AuthorizationPolicy, Claims, RoutePermissions, TokenService};
use crate::config::GatewayConfig;
use crate::observability::metrics;
use crate::security::{
    resolve_client_identity, AuthRequirement, HeaderValidator, RateLimitStatus,
    SlidingWindowLimiter,
};

/// Outcome of a passed admission chain.
#[derive(Debug)]
pub struct Admission {
    /// Verified principal, absent on anonymous or auth-excluded routes.
    pub claims: Option<Claims>,
    /// Limiter snapshot, absent when the path is limiter-excluded.
    pub rate: Option<RateLimitStatus>,
}

/// Outcome of a failed admission chain.
#[derive(Debug)]
pub struct Rejection {
    pub error: AuthError,
    /// Present when the limiter stage ran before the failure.
    pub rate: Option<RateLimitStatus>,
}

/// The ordered admission chain, built once at startup and shared.
pub struct RequestPipeline {
    validator: HeaderValidator,
    limiter: Arc<SlidingWindowLimiter>,
    tokens: Arc<TokenService>,
    policy: AuthorizationPolicy,
    routes: RoutePermissions,
}

impl RequestPipeline {
    pub fn new(
        config: &GatewayConfig,
        tokens: Arc<TokenService>,
        limiter: Arc<SlidingWindowLimiter>,
    ) -> Self {
        Self {
            validator: HeaderValidator::new(
                config.headers.clone(),
                config.auth_paths.clone(),
            ),
            limiter,
            tokens,
            policy: AuthorizationPolicy::from_table(config.authorization.roles.clone()),
            routes: RoutePermissions::new(config.authorization.route_permissions.clone()),
        }
    }

    /// Run the admission chain for one request.
    pub fn admit(
        &self,
        method: &Method,
        path: &str,
        headers: &HeaderMap,
        peer: Option<SocketAddr>,
    ) -> Result<Admission, Rejection> {
        let requirement = self.validator.classify(path);

        // Stage 1: header hygiene. Nothing here touches crypto.
        let token = if requirement == AuthRequirement::Excluded {
            None
        } else {
            let token = self
                .validator
                .extract_token(headers, requirement)
                .map_err(|error| self.reject(error, None))?;
            self.validator
                .validate_content_type(method, headers)
                .map_err(|error| self.reject(error, None))?;
            token
        };

        // Stage 2: rate limiting, before any signature verification.
        let rate = if self.limiter.is_excluded(path) {
            None
        } else {
            let identity = resolve_client_identity(headers, peer);
            match self.limiter.check(&identity, path) {
                Ok(status) => Some(status),
                Err(status) => {
                    metrics::record_rate_limited();
                    return Err(self.reject(AuthError::RateLimited, Some(status)));
                }
            }
        };

        if requirement == AuthRequirement::Excluded {
            return Ok(self.accept(None, rate));
        }

        // Stage 3: token verification.
        let claims = match token {
            Some(token) => Some(
                self.tokens
                    .verify_access(&token)
                    .map_err(|error| self.reject(error, rate))?,
            ),
            None => None,
        };

        // Stage 4: route authorization. A protected route with no principal
        // is an authentication failure, not an authorization one.
        if let Some(required) = self.routes.required_permission(method, path) {
            match &claims {
                None => return Err(self.reject(AuthError::MissingToken, rate)),
                Some(claims) => {
                    self.policy
                        .authorize(claims, required)
                        .map_err(|error| self.reject(error, rate))?;
                }
            }
        }

        Ok(self.accept(claims, rate))
    }

    fn accept(&self, claims: Option<Claims>, rate: Option<RateLimitStatus>) -> Admission {
        metrics::record_admitted();
        Admission { claims, rate }
    }

    fn reject(&self, error: AuthError, rate: Option<RateLimitStatus>) -> Rejection {
        metrics::record_rejection(error.kind());
        tracing::debug!(kind = error.kind(), status = %error.status(), "Request rejected");
        Rejection { error, rate }
    }
}

/// Axum middleware running the admission chain ahead of every route.
pub async fn admission_middleware(
    State(pipeline): State<Arc<RequestPipeline>>,
    mut request: Request,
    next: Next,
) -> Response {
    let peer = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|info| info.0);

    let outcome = pipeline.admit(
        request.method(),
        request.uri().path(),
        request.headers(),
        peer,
    );

    match outcome {
        Ok(admission) => {
            if let Some(claims) = admission.claims {
                request.extensions_mut().insert(claims);
            }
            let mut response = next.run(request).await;
            apply_rate_headers(response.headers_mut(), admission.rate);
            response
        }
        Err(rejection) => {
            let mut response = rejection.error.into_response();
            apply_rate_headers(response.headers_mut(), rejection.rate);
            response
        }
    }
}

/// Stamp `X-RateLimit-*` headers when the limiter stage ran.
fn apply_rate_headers(headers: &mut HeaderMap, rate: Option<RateLimitStatus>) {
    let Some(rate) = rate else { return };
    headers.insert("x-ratelimit-limit", HeaderValue::from(rate.limit));
    headers.insert("x-ratelimit-remaining", HeaderValue::from(rate.remaining));
    headers.insert("x-ratelimit-reset", HeaderValue::from(rate.reset));
}
