//! Configuration schema.
//!
//! Every section and field has a default, so a missing or partial file still
//! yields a runnable gateway. Defaults target local development; production
//! deployments are expected to override at least the signing secret.

use std::collections::HashMap;

use serde::Deserialize;

/// Top-level gateway configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct GatewayConfig {
    pub listener: ListenerConfig,
    pub timeouts: TimeoutConfig,
    pub jwt: JwtConfig,
    pub headers: HeaderConfig,
    pub auth_paths: AuthPathsConfig,
    pub rate_limit: RateLimitConfig,
    pub authorization: AuthorizationConfig,
    pub identity: IdentityConfig,
    pub observability: ObservabilityConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ListenerConfig {
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Whole-request deadline, in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self { request_secs: 30 }
    }
}

/// Token signing and lifetime settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct JwtConfig {
    pub secret: String,
    /// HS256, HS384 or HS512.
    pub algorithm: String,
    pub access_ttl_minutes: i64,
    pub refresh_ttl_days: i64,
}

impl Default for JwtConfig {
    fn default() -> Self {
        Self {
            secret: "CHANGE_ME_IN_PRODUCTION".to_string(),
            algorithm: "HS256".to_string(),
            access_ttl_minutes: 15,
            refresh_ttl_days: 7,
        }
    }
}

/// Authorization-header hygiene settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HeaderConfig {
    /// When false, length and charset lints are skipped; structural checks
    /// always run.
    pub strict: bool,
    pub min_token_length: usize,
    pub max_token_length: usize,
}

impl Default for HeaderConfig {
    fn default() -> Self {
        Self {
            strict: true,
            min_token_length: 10,
            max_token_length: 8192,
        }
    }
}

/// Which path prefixes require, tolerate, or bypass authentication.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AuthPathsConfig {
    pub required: Vec<String>,
    pub optional: Vec<String>,
    pub excluded: Vec<String>,
}

impl Default for AuthPathsConfig {
    fn default() -> Self {
        Self {
            required: vec![
                "/api/users".to_string(),
                "/api/orders".to_string(),
                "/api/stock".to_string(),
            ],
            optional: vec!["/api/auth".to_string()],
            excluded: vec![
                "/health".to_string(),
                "/metrics".to_string(),
                "/docs".to_string(),
            ],
        }
    }
}

/// Sliding-window rate limiting settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RateLimitConfig {
    /// Requests admitted per full window.
    pub default_limit: u32,
    /// Requests admitted per 10-second burst sub-window.
    pub burst_limit: u32,
    pub window_seconds: u64,
    pub excluded_paths: Vec<String>,
    pub overrides: Vec<RateLimitOverride>,
    /// Interval for the idle-key sweeper task.
    pub sweep_interval_seconds: u64,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            default_limit: 60,
            burst_limit: 120,
            window_seconds: 60,
            excluded_paths: vec!["/health".to_string(), "/metrics".to_string()],
            overrides: vec![],
            sweep_interval_seconds: 300,
        }
    }
}

/// Per-route-prefix limit override.
#[derive(Debug, Clone, Deserialize)]
pub struct RateLimitOverride {
    pub prefix: String,
    pub limit: u32,
    pub burst: u32,
}

/// Role table and per-route permission requirements.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AuthorizationConfig {
    /// Role name → granted permissions. Empty means the built-in table.
    pub roles: HashMap<String, Vec<String>>,
    pub route_permissions: Vec<RoutePermission>,
}

impl Default for AuthorizationConfig {
    fn default() -> Self {
        Self {
            roles: HashMap::new(),
            route_permissions: default_route_permissions(),
        }
    }
}

/// A path prefix plus the permission its requests must hold.
#[derive(Debug, Clone, Deserialize)]
pub struct RoutePermission {
    pub prefix: String,
    /// Matching methods; empty matches all.
    #[serde(default)]
    pub methods: Vec<String>,
    pub permission: String,
}

/// Built-in route table: reads need `:read`, everything else `:write`,
/// for each core ERP resource.
pub fn default_route_permissions() -> Vec<RoutePermission> {
    let mut rules = Vec::new();
    for resource in ["users", "orders", "stock"] {
        rules.push(RoutePermission {
            prefix: format!("/api/{resource}"),
            methods: vec!["GET".to_string(), "HEAD".to_string()],
            permission: format!("{resource}:read"),
        });
        rules.push(RoutePermission {
            prefix: format!("/api/{resource}"),
            methods: vec![],
            permission: format!("{resource}:write"),
        });
    }
    rules
}

/// Users seeded into the in-memory identity store.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct IdentityConfig {
    pub users: Vec<UserEntry>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UserEntry {
    pub subject: String,
    pub username: String,
    pub role: String,
    /// bcrypt digest, as produced by the credential store.
    pub password_digest: String,
    #[serde(default)]
    pub permissions: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    pub log_level: String,
    pub metrics_enabled: bool,
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: true,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_complete() {
        let config = GatewayConfig::default();
        assert_eq!(config.listener.bind_address, "0.0.0.0:8080");
        assert_eq!(config.jwt.algorithm, "HS256");
        assert_eq!(config.rate_limit.default_limit, 60);
        assert_eq!(config.rate_limit.burst_limit, 120);
        assert_eq!(config.headers.max_token_length, 8192);
        assert!(!config.authorization.route_permissions.is_empty());
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let config: GatewayConfig = toml::from_str(
            r#"
            [jwt]
            secret = "from-file"

            [rate_limit]
            default_limit = 5
            "#,
        )
        .unwrap();

        assert_eq!(config.jwt.secret, "from-file");
        assert_eq!(config.jwt.access_ttl_minutes, 15);
        assert_eq!(config.rate_limit.default_limit, 5);
        assert_eq!(config.rate_limit.window_seconds, 60);
    }

    #[test]
    fn test_default_route_permissions_cover_resources() {
        let rules = default_route_permissions();
        assert_eq!(rules.len(), 6);
        assert!(rules
            .iter()
            .any(|r| r.prefix == "/api/orders" && r.permission == "orders:write"));
    }
}
