//! Authorization-header and content-type hygiene.
//!
//! Requests are linted before any cryptographic work happens: a request
//! whose header is structurally broken never reaches token verification.
//! Structural checks (scheme, emptiness) always run; length and charset
//! lints are gated on strict mode.

use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::{HeaderMap, Method};

use crate::auth::error::AuthError;
use crate::config::{AuthPathsConfig, HeaderConfig};

/// How a route relates to authentication.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthRequirement {
    /// A valid token is mandatory.
    Required,
    /// A token is verified if present, but absence is fine.
    Optional,
    /// The route bypasses authentication entirely.
    Excluded,
}

/// Stateless validator for inbound credential material.
#[derive(Debug, Clone)]
pub struct HeaderValidator {
    config: HeaderConfig,
    paths: AuthPathsConfig,
}

impl HeaderValidator {
    pub fn new(config: HeaderConfig, paths: AuthPathsConfig) -> Self {
        Self { config, paths }
    }

    /// Classify a path. Excluded wins over required, required over
    /// optional; unlisted paths default to optional.
    pub fn classify(&self, path: &str) -> AuthRequirement {
        let matches = |prefixes: &[String]| prefixes.iter().any(|p| path.starts_with(p.as_str()));

        if matches(&self.paths.excluded) {
            AuthRequirement::Excluded
        } else if matches(&self.paths.required) {
            AuthRequirement::Required
        } else {
            AuthRequirement::Optional
        }
    }

    /// Extract and lint the bearer token. `Ok(None)` means the request is
    /// anonymous and the route tolerates that.
    pub fn extract_token(
        &self,
        headers: &HeaderMap,
        requirement: AuthRequirement,
    ) -> Result<Option<String>, AuthError> {
        let header = match headers.get(AUTHORIZATION) {
            Some(value) => value.to_str().map_err(|_| AuthError::InvalidChars)?,
            None => {
                return match requirement {
                    AuthRequirement::Required => Err(AuthError::MissingToken),
                    _ => Ok(None),
                };
            }
        };

        let token = header
            .strip_prefix("Bearer ")
            .ok_or(AuthError::InvalidFormat)?;

        if token.trim().is_empty() {
            return Err(AuthError::EmptyToken);
        }
        // "Bearer  <token>" smuggles a leading space into the token.
        if token.starts_with(char::is_whitespace) || token.ends_with(char::is_whitespace) {
            return Err(AuthError::InvalidFormat);
        }

        if self.config.strict {
            if token.len() < self.config.min_token_length {
                return Err(AuthError::TooShort);
            }
            if token.len() > self.config.max_token_length {
                return Err(AuthError::TooLong);
            }
            if !is_token_charset(token) {
                return Err(AuthError::InvalidChars);
            }
        }

        Ok(Some(token.to_string()))
    }

    /// Body-carrying methods must declare a JSON payload.
    pub fn validate_content_type(
        &self,
        method: &Method,
        headers: &HeaderMap,
    ) -> Result<(), AuthError> {
        if !matches!(*method, Method::POST | Method::PUT | Method::PATCH) {
            return Ok(());
        }

        let content_type = headers
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("");

        // Allow parameters such as "; charset=utf-8".
        let mime = content_type
            .split(';')
            .next()
            .unwrap_or("")
            .trim()
            .to_ascii_lowercase();
        if mime == "application/json" {
            Ok(())
        } else {
            Err(AuthError::InvalidContentType)
        }
    }
}

/// Token charset: base64/base64url plus the unreserved URI extras, with
/// padding tolerated only at the end.
fn is_token_charset(token: &str) -> bool {
    let unpadded = token.trim_end_matches('=');
    unpadded
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '.' | '_' | '~' | '+' | '/'))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn validator() -> HeaderValidator {
        HeaderValidator::new(HeaderConfig::default(), AuthPathsConfig::default())
    }

    fn header_map(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn test_classify_precedence() {
        let v = validator();
        assert_eq!(v.classify("/health"), AuthRequirement::Excluded);
        assert_eq!(v.classify("/api/orders/3"), AuthRequirement::Required);
        assert_eq!(v.classify("/api/auth/login"), AuthRequirement::Optional);
        assert_eq!(v.classify("/unknown"), AuthRequirement::Optional);
    }

    #[test]
    fn test_missing_header_required_vs_optional() {
        let v = validator();
        let empty = HeaderMap::new();

        assert_eq!(
            v.extract_token(&empty, AuthRequirement::Required).unwrap_err(),
            AuthError::MissingToken
        );
        assert_eq!(v.extract_token(&empty, AuthRequirement::Optional).unwrap(), None);
    }

    #[test]
    fn test_valid_bearer_token() {
        let v = validator();
        let headers = header_map("Bearer abcdef.ghijkl.mnopqr");

        let token = v.extract_token(&headers, AuthRequirement::Required).unwrap();
        assert_eq!(token.as_deref(), Some("abcdef.ghijkl.mnopqr"));
    }

    #[test]
    fn test_wrong_scheme_is_invalid_format() {
        let v = validator();
        for value in ["Basic dXNlcjpwYXNz", "bearer abcdef.ghijkl.mnopqr", "Token abc"] {
            assert_eq!(
                v.extract_token(&header_map(value), AuthRequirement::Required)
                    .unwrap_err(),
                AuthError::InvalidFormat,
                "value {value:?}"
            );
        }
    }

    #[test]
    fn test_empty_token_detected() {
        let v = validator();
        assert_eq!(
            v.extract_token(&header_map("Bearer  "), AuthRequirement::Required)
                .unwrap_err(),
            AuthError::EmptyToken
        );
    }

    #[test]
    fn test_double_space_is_invalid_format() {
        let v = validator();
        assert_eq!(
            v.extract_token(&header_map("Bearer  abcdef.ghijkl.mnopqr"), AuthRequirement::Required)
                .unwrap_err(),
            AuthError::InvalidFormat
        );
    }

    #[test]
    fn test_length_bounds() {
        let v = validator();

        // One below the minimum fails, the minimum itself passes.
        let short = format!("Bearer {}", "a".repeat(9));
        assert_eq!(
            v.extract_token(&header_map(&short), AuthRequirement::Required)
                .unwrap_err(),
            AuthError::TooShort
        );
        let min = format!("Bearer {}", "a".repeat(10));
        assert!(v.extract_token(&header_map(&min), AuthRequirement::Required).is_ok());

        // One above the maximum fails, the maximum itself passes.
        let long = format!("Bearer {}", "a".repeat(8193));
        assert_eq!(
            v.extract_token(&header_map(&long), AuthRequirement::Required)
                .unwrap_err(),
            AuthError::TooLong
        );
        let max = format!("Bearer {}", "a".repeat(8192));
        assert!(v.extract_token(&header_map(&max), AuthRequirement::Required).is_ok());
    }

    #[test]
    fn test_invalid_charset() {
        let v = validator();
        assert_eq!(
            v.extract_token(&header_map("Bearer abc!def$ghi.jkl"), AuthRequirement::Required)
                .unwrap_err(),
            AuthError::InvalidChars
        );
        // Padding is only tolerated at the end.
        assert_eq!(
            v.extract_token(&header_map("Bearer ab=cd.efgh.ijklmn"), AuthRequirement::Required)
                .unwrap_err(),
            AuthError::InvalidChars
        );
        assert!(v
            .extract_token(&header_map("Bearer abcd.efgh.ijklmn=="), AuthRequirement::Required)
            .is_ok());
    }

    #[test]
    fn test_lenient_mode_skips_lints() {
        let v = HeaderValidator::new(
            HeaderConfig {
                strict: false,
                ..HeaderConfig::default()
            },
            AuthPathsConfig::default(),
        );

        // Short and odd-charset tokens pass; scheme errors still fail.
        assert!(v
            .extract_token(&header_map("Bearer ab!"), AuthRequirement::Required)
            .is_ok());
        assert_eq!(
            v.extract_token(&header_map("Basic abc"), AuthRequirement::Required)
                .unwrap_err(),
            AuthError::InvalidFormat
        );
    }

    #[test]
    fn test_content_type_gate() {
        let v = validator();
        let mut headers = HeaderMap::new();

        // GET is exempt.
        assert!(v.validate_content_type(&Method::GET, &headers).is_ok());
        // POST without a content type fails.
        assert_eq!(
            v.validate_content_type(&Method::POST, &headers).unwrap_err(),
            AuthError::InvalidContentType
        );

        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json; charset=utf-8"));
        assert!(v.validate_content_type(&Method::POST, &headers).is_ok());

        headers.insert(CONTENT_TYPE, HeaderValue::from_static("text/plain"));
        assert_eq!(
            v.validate_content_type(&Method::PUT, &headers).unwrap_err(),
            AuthError::InvalidContentType
        );
    }
}
