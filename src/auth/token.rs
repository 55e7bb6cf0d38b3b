//! Signed token issuing and verification.
//!
//! Tokens are signed with a symmetric secret using an HS-family algorithm
//! from the configuration. Verification is strict: zero leeway on `exp`,
//! only the configured algorithm is accepted, and the three failure modes
//! (expired, bad signature, malformed) remain distinguishable. Tokens are
//! never revoked server-side; the model is fully stateless.

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use uuid::Uuid;

use crate::auth::claims::{Claims, PURPOSE_ACCESS, PURPOSE_REFRESH};
use crate::auth::error::AuthError;
use crate::config::JwtConfig;

/// Parse a configured algorithm name. Only symmetric HS variants are
/// supported since the signing key is a shared secret.
pub fn parse_algorithm(name: &str) -> Option<Algorithm> {
    match name {
        "HS256" => Some(Algorithm::HS256),
        "HS384" => Some(Algorithm::HS384),
        "HS512" => Some(Algorithm::HS512),
        _ => None,
    }
}

/// Issues and verifies signed, time-bounded credential tokens.
pub struct TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    algorithm: Algorithm,
    access_ttl: Duration,
    refresh_ttl: Duration,
}

impl TokenService {
    /// Build from config. Fails if the algorithm name is not an HS variant;
    /// config validation reports this earlier with a better message.
    pub fn new(config: &JwtConfig) -> Result<Self, AuthError> {
        let algorithm = parse_algorithm(&config.algorithm).ok_or_else(|| {
            AuthError::Malformed(format!("unsupported algorithm {}", config.algorithm))
        })?;

        Ok(Self {
            encoding: EncodingKey::from_secret(config.secret.as_bytes()),
            decoding: DecodingKey::from_secret(config.secret.as_bytes()),
            algorithm,
            access_ttl: Duration::minutes(config.access_ttl_minutes),
            refresh_ttl: Duration::days(config.refresh_ttl_days),
        })
    }

    /// Issue a token with an explicit TTL. A non-positive TTL produces a
    /// token that is already expired; issuing never validates.
    pub fn issue(
        &self,
        subject: &str,
        role: &str,
        permissions: &[String],
        ttl: Duration,
        purpose: &str,
    ) -> Result<String, AuthError> {
        let now = Utc::now().timestamp();
        let claims = Claims {
            sub: subject.to_string(),
            role: role.to_string(),
            permissions: permissions.to_vec(),
            iat: now,
            exp: now + ttl.num_seconds(),
            jti: Uuid::new_v4().to_string(),
            purpose: Some(purpose.to_string()),
        };

        encode(&Header::new(self.algorithm), &claims, &self.encoding)
            .map_err(|_| AuthError::Internal)
    }

    /// Issue an access token with the configured TTL.
    pub fn issue_access(
        &self,
        subject: &str,
        role: &str,
        permissions: &[String],
    ) -> Result<String, AuthError> {
        self.issue(subject, role, permissions, self.access_ttl, PURPOSE_ACCESS)
    }

    /// Issue a refresh token with the configured TTL. Refresh tokens carry
    /// no explicit permissions; those are re-derived on exchange.
    pub fn issue_refresh(&self, subject: &str, role: &str) -> Result<String, AuthError> {
        self.issue(subject, role, &[], self.refresh_ttl, PURPOSE_REFRESH)
    }

    /// Access-token TTL in seconds, for `expires_in` response metadata.
    pub fn access_ttl_secs(&self) -> i64 {
        self.access_ttl.num_seconds()
    }

    /// Decode and validate a token: signature first, then strict expiry.
    pub fn verify(&self, token: &str) -> Result<Claims, AuthError> {
        let mut validation = Validation::new(self.algorithm);
        validation.leeway = 0;
        validation.validate_exp = true;

        let data =
            decode::<Claims>(token, &self.decoding, &validation).map_err(map_jwt_error)?;

        // jsonwebtoken accepts exp == now; the contract is exp > now.
        if data.claims.is_expired() {
            return Err(AuthError::Expired);
        }
        Ok(data.claims)
    }

    /// Verify a token presented for API access. Refresh tokens are not
    /// valid credentials for protected routes.
    pub fn verify_access(&self, token: &str) -> Result<Claims, AuthError> {
        let claims = self.verify(token)?;
        if claims.is_refresh() {
            return Err(AuthError::Malformed(
                "refresh token used as access token".to_string(),
            ));
        }
        Ok(claims)
    }

    /// Verify a token presented for refresh exchange.
    pub fn verify_refresh(&self, token: &str) -> Result<Claims, AuthError> {
        let claims = self.verify(token)?;
        if !claims.is_refresh() {
            return Err(AuthError::Malformed("not a refresh token".to_string()));
        }
        Ok(claims)
    }
}

fn map_jwt_error(err: jsonwebtoken::errors::Error) -> AuthError {
    use jsonwebtoken::errors::ErrorKind;

    match err.kind() {
        ErrorKind::ExpiredSignature => AuthError::Expired,
        ErrorKind::InvalidSignature => AuthError::InvalidSignature,
        ErrorKind::InvalidToken => AuthError::Malformed("invalid token structure".to_string()),
        ErrorKind::InvalidAlgorithm => {
            AuthError::Malformed("unexpected signing algorithm".to_string())
        }
        ErrorKind::Base64(_) => AuthError::Malformed("invalid base64 encoding".to_string()),
        ErrorKind::Json(_) => AuthError::Malformed("invalid claims".to_string()),
        ErrorKind::MissingRequiredClaim(claim) => {
            AuthError::Malformed(format!("missing claim {claim}"))
        }
        _ => AuthError::Malformed("token validation failed".to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> TokenService {
        TokenService::new(&JwtConfig {
            secret: "unit-test-secret".to_string(),
            algorithm: "HS256".to_string(),
            access_ttl_minutes: 15,
            refresh_ttl_days: 7,
        })
        .unwrap()
    }

    fn other_secret_service() -> TokenService {
        TokenService::new(&JwtConfig {
            secret: "a-different-secret".to_string(),
            algorithm: "HS256".to_string(),
            access_ttl_minutes: 15,
            refresh_ttl_days: 7,
        })
        .unwrap()
    }

    #[test]
    fn test_round_trip_preserves_subject_and_role() {
        let svc = service();
        let token = svc
            .issue("user-42", "admin", &[], Duration::minutes(15), PURPOSE_ACCESS)
            .unwrap();

        let claims = svc.verify(&token).unwrap();
        assert_eq!(claims.sub, "user-42");
        assert_eq!(claims.role, "admin");
        assert!(!claims.jti.is_empty());
    }

    #[test]
    fn test_round_trip_preserves_permissions() {
        let svc = service();
        let perms = vec!["orders:read".to_string(), "orders:write".to_string()];
        let token = svc.issue_access("user-1", "user", &perms).unwrap();

        let claims = svc.verify(&token).unwrap();
        assert_eq!(claims.permissions, perms);
    }

    #[test]
    fn test_zero_ttl_verifies_as_expired() {
        let svc = service();
        let token = svc
            .issue("user-1", "user", &[], Duration::seconds(0), PURPOSE_ACCESS)
            .unwrap();

        assert_eq!(svc.verify(&token).unwrap_err(), AuthError::Expired);
    }

    #[test]
    fn test_negative_ttl_verifies_as_expired() {
        let svc = service();
        let token = svc
            .issue("user-1", "user", &[], Duration::minutes(-5), PURPOSE_ACCESS)
            .unwrap();

        assert_eq!(svc.verify(&token).unwrap_err(), AuthError::Expired);
    }

    #[test]
    fn test_wrong_secret_is_invalid_signature() {
        let token = service().issue_access("user-1", "user", &[]).unwrap();

        assert_eq!(
            other_secret_service().verify(&token).unwrap_err(),
            AuthError::InvalidSignature
        );
    }

    #[test]
    fn test_garbage_token_is_malformed() {
        let err = service().verify("not.a.token").unwrap_err();
        assert!(matches!(err, AuthError::Malformed(_)));
    }

    #[test]
    fn test_token_missing_role_is_malformed() {
        // Hand-build a token without the role claim.
        #[derive(serde::Serialize)]
        struct Partial {
            sub: String,
            iat: i64,
            exp: i64,
            jti: String,
        }
        let svc = service();
        let partial = Partial {
            sub: "user-1".to_string(),
            iat: Utc::now().timestamp(),
            exp: Utc::now().timestamp() + 600,
            jti: "x".to_string(),
        };
        let token = encode(
            &Header::new(Algorithm::HS256),
            &partial,
            &EncodingKey::from_secret(b"unit-test-secret"),
        )
        .unwrap();

        assert!(matches!(svc.verify(&token).unwrap_err(), AuthError::Malformed(_)));
    }

    #[test]
    fn test_refresh_token_rejected_for_access() {
        let svc = service();
        let refresh = svc.issue_refresh("user-1", "user").unwrap();

        assert!(svc.verify_refresh(&refresh).is_ok());
        assert!(matches!(
            svc.verify_access(&refresh).unwrap_err(),
            AuthError::Malformed(_)
        ));
    }

    #[test]
    fn test_access_token_rejected_for_refresh() {
        let svc = service();
        let access = svc.issue_access("user-1", "user", &[]).unwrap();

        assert!(matches!(
            svc.verify_refresh(&access).unwrap_err(),
            AuthError::Malformed(_)
        ));
    }

    #[test]
    fn test_parse_algorithm() {
        assert_eq!(parse_algorithm("HS256"), Some(Algorithm::HS256));
        assert_eq!(parse_algorithm("HS512"), Some(Algorithm::HS512));
        assert_eq!(parse_algorithm("RS256"), None);
        assert_eq!(parse_algorithm("none"), None);
    }
}
