//! Configuration loading.
//!
//! Precedence, lowest to highest: built-in defaults, TOML file, environment
//! variables. The loaded result is validated before use; a config that
//! parses but cannot run is rejected at startup, not at request time.

use std::path::Path;

use crate::config::schema::GatewayConfig;
use crate::config::validation::{validate, ConfigError};

/// Load configuration from a TOML file, apply environment overrides, and
/// validate the result.
pub fn load_config(path: &Path) -> Result<GatewayConfig, ConfigError> {
    let raw = std::fs::read_to_string(path)
        .map_err(|e| ConfigError::Io(path.display().to_string(), e))?;
    let mut config: GatewayConfig = toml::from_str(&raw).map_err(ConfigError::Parse)?;

    apply_env_overrides(&mut config);
    validate(&config)?;
    Ok(config)
}

/// Build the default configuration with environment overrides applied.
/// Used when no config file is given.
pub fn default_config() -> Result<GatewayConfig, ConfigError> {
    let mut config = GatewayConfig::default();
    apply_env_overrides(&mut config);
    validate(&config)?;
    Ok(config)
}

/// Environment variables override file values. Unparseable numeric values
/// are logged and ignored rather than aborting startup.
fn apply_env_overrides(config: &mut GatewayConfig) {
    if let Ok(v) = std::env::var("JWT_SECRET_KEY") {
        config.jwt.secret = v;
    }
    if let Ok(v) = std::env::var("JWT_ALGORITHM") {
        config.jwt.algorithm = v;
    }
    if let Ok(v) = std::env::var("ACCESS_TOKEN_TTL_MINUTES") {
        parse_override("ACCESS_TOKEN_TTL_MINUTES", &v, &mut config.jwt.access_ttl_minutes);
    }
    if let Ok(v) = std::env::var("REFRESH_TOKEN_TTL_DAYS") {
        parse_override("REFRESH_TOKEN_TTL_DAYS", &v, &mut config.jwt.refresh_ttl_days);
    }
    if let Ok(v) = std::env::var("DEFAULT_RATE_LIMIT") {
        parse_override("DEFAULT_RATE_LIMIT", &v, &mut config.rate_limit.default_limit);
    }
    if let Ok(v) = std::env::var("BURST_RATE_LIMIT") {
        parse_override("BURST_RATE_LIMIT", &v, &mut config.rate_limit.burst_limit);
    }
    if let Ok(v) = std::env::var("RATE_LIMIT_WINDOW_SECONDS") {
        parse_override(
            "RATE_LIMIT_WINDOW_SECONDS",
            &v,
            &mut config.rate_limit.window_seconds,
        );
    }
    if let Ok(v) = std::env::var("STRICT_HEADER_VALIDATION") {
        parse_override("STRICT_HEADER_VALIDATION", &v, &mut config.headers.strict);
    }
}

fn parse_override<T: std::str::FromStr>(name: &str, value: &str, slot: &mut T) {
    match value.parse() {
        Ok(parsed) => *slot = parsed,
        Err(_) => {
            tracing::warn!(var = name, value, "Ignoring unparseable environment override");
        }
    }
}
