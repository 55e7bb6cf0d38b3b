//! Startup-time configuration validation.
//!
//! All problems are collected and reported together, so an operator fixes a
//! broken file in one round trip instead of one error per restart.

use thiserror::Error;

use crate::auth::token::parse_algorithm;
use crate::config::schema::GatewayConfig;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {0}: {1}")]
    Io(String, #[source] std::io::Error),

    #[error("failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid configuration:\n{}", format_errors(.0))]
    Validation(Vec<ValidationError>),
}

#[derive(Debug, Error)]
#[error("{field}: {message}")]
pub struct ValidationError {
    pub field: String,
    pub message: String,
}

fn format_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(|e| format!("  - {e}"))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Check semantic constraints the TOML schema cannot express.
pub fn validate(config: &GatewayConfig) -> Result<(), ConfigError> {
    let mut errors = Vec::new();
    let mut fail = |field: &str, message: String| {
        errors.push(ValidationError {
            field: field.to_string(),
            message,
        });
    };

    if config.jwt.secret.is_empty() {
        fail("jwt.secret", "must not be empty".to_string());
    }
    if parse_algorithm(&config.jwt.algorithm).is_none() {
        fail(
            "jwt.algorithm",
            format!(
                "unsupported algorithm {:?}; expected HS256, HS384 or HS512",
                config.jwt.algorithm
            ),
        );
    }
    if config.jwt.access_ttl_minutes <= 0 {
        fail("jwt.access_ttl_minutes", "must be positive".to_string());
    }
    if config.jwt.refresh_ttl_days <= 0 {
        fail("jwt.refresh_ttl_days", "must be positive".to_string());
    }

    if config.headers.min_token_length > config.headers.max_token_length {
        fail(
            "headers.min_token_length",
            format!(
                "exceeds max_token_length ({} > {})",
                config.headers.min_token_length, config.headers.max_token_length
            ),
        );
    }

    if config.rate_limit.default_limit == 0 {
        fail("rate_limit.default_limit", "must be positive".to_string());
    }
    if config.rate_limit.burst_limit == 0 {
        fail("rate_limit.burst_limit", "must be positive".to_string());
    }
    if config.rate_limit.window_seconds == 0 {
        fail("rate_limit.window_seconds", "must be positive".to_string());
    }
    for (i, ovr) in config.rate_limit.overrides.iter().enumerate() {
        if ovr.prefix.is_empty() {
            fail(
                &format!("rate_limit.overrides[{i}].prefix"),
                "must not be empty".to_string(),
            );
        }
        if ovr.limit == 0 || ovr.burst == 0 {
            fail(
                &format!("rate_limit.overrides[{i}]"),
                "limit and burst must be positive".to_string(),
            );
        }
    }

    if config.timeouts.request_secs == 0 {
        fail("timeouts.request_secs", "must be positive".to_string());
    }

    for (i, rule) in config.authorization.route_permissions.iter().enumerate() {
        if rule.prefix.is_empty() {
            fail(
                &format!("authorization.route_permissions[{i}].prefix"),
                "must not be empty".to_string(),
            );
        }
        if rule.permission.is_empty() {
            fail(
                &format!("authorization.route_permissions[{i}].permission"),
                "must not be empty".to_string(),
            );
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(ConfigError::Validation(errors))
    }
}
