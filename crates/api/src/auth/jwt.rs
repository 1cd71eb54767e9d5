//! JWT token issuer.
//!
//! Both halves of a credential pair are HS256-signed JWTs carrying
//! [`TokenClaims`]; the `typ` claim tells them apart. Refresh tokens are
//! additionally tracked server-side by their SHA-256 hash so they can be
//! rotated and revoked.

use cats_core::auth::{IssuedTokens, TokenClaims, TokenIssuer, TokenKind};
use cats_core::error::CoreError;
use cats_core::roles::Role;
use cats_core::types::DbId;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use uuid::Uuid;

use crate::config::{parse_var, required_var, ConfigError, Lookup};

/// Configuration for JWT token generation and validation.
#[derive(Debug, Clone)]
pub struct JwtConfig {
    /// HMAC-SHA256 secret used to sign and verify tokens.
    pub secret: String,
    /// Access token lifetime in minutes (default: 15).
    pub access_token_expiry_mins: i64,
    /// Refresh token lifetime in days (default: 7).
    pub refresh_token_expiry_days: i64,
}

/// Default access token expiry in minutes.
const DEFAULT_ACCESS_EXPIRY_MINS: i64 = 15;
/// Default refresh token expiry in days.
const DEFAULT_REFRESH_EXPIRY_DAYS: i64 = 7;

impl JwtConfig {
    /// Load JWT configuration.
    ///
    /// | Env Var                    | Required | Default |
    /// |----------------------------|----------|---------|
    /// | `JWT_SECRET`               | **yes**  | --      |
    /// | `JWT_ACCESS_EXPIRY_MINS`   | no       | `15`    |
    /// | `JWT_REFRESH_EXPIRY_DAYS`  | no       | `7`     |
    pub fn from_lookup(lookup: &impl Lookup) -> Result<Self, ConfigError> {
        Ok(Self {
            secret: required_var(lookup, "JWT_SECRET")?,
            access_token_expiry_mins: parse_var(
                lookup,
                "JWT_ACCESS_EXPIRY_MINS",
                DEFAULT_ACCESS_EXPIRY_MINS,
            )?,
            refresh_token_expiry_days: parse_var(
                lookup,
                "JWT_REFRESH_EXPIRY_DAYS",
                DEFAULT_REFRESH_EXPIRY_DAYS,
            )?,
        })
    }
}

/// [`TokenIssuer`] backed by `jsonwebtoken`.
pub struct JwtIssuer {
    config: JwtConfig,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
}

impl JwtIssuer {
    pub fn new(config: JwtConfig) -> Self {
        let encoding_key = EncodingKey::from_secret(config.secret.as_bytes());
        let decoding_key = DecodingKey::from_secret(config.secret.as_bytes());
        // Sessions expire at exactly `exp`; a token must not outlive its row.
        let mut validation = Validation::default();
        validation.leeway = 0;
        Self {
            config,
            encoding_key,
            decoding_key,
            validation,
        }
    }

    fn sign(&self, claims: &TokenClaims) -> Result<String, CoreError> {
        encode(&Header::default(), claims, &self.encoding_key)
            .map_err(|e| CoreError::Internal(format!("Token generation error: {e}")))
    }
}

impl TokenIssuer for JwtIssuer {
    fn issue(&self, user_id: DbId, role: Role) -> Result<IssuedTokens, CoreError> {
        let now = Utc::now();
        let access_ttl = Duration::minutes(self.config.access_token_expiry_mins);
        let refresh_expires_at = now + Duration::days(self.config.refresh_token_expiry_days);

        let access = TokenClaims {
            sub: user_id,
            role,
            typ: TokenKind::Access,
            exp: (now + access_ttl).timestamp(),
            iat: now.timestamp(),
            jti: Uuid::new_v4().to_string(),
        };
        let refresh = TokenClaims {
            typ: TokenKind::Refresh,
            exp: refresh_expires_at.timestamp(),
            jti: Uuid::new_v4().to_string(),
            ..access.clone()
        };

        Ok(IssuedTokens {
            access_token: self.sign(&access)?,
            refresh_token: self.sign(&refresh)?,
            refresh_expires_at,
        })
    }

    fn verify(&self, token: &str, kind: TokenKind) -> Result<TokenClaims, CoreError> {
        let claims = decode::<TokenClaims>(token, &self.decoding_key, &self.validation)
            .map_err(|e| {
                tracing::debug!(error = %e, ?kind, "Token rejected");
                CoreError::InvalidToken
            })?
            .claims;

        if claims.typ != kind {
            tracing::debug!(expected = ?kind, actual = ?claims.typ, "Token kind mismatch");
            return Err(CoreError::InvalidToken);
        }
        Ok(claims)
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    /// Helper to build a test config with a known secret.
    fn test_config() -> JwtConfig {
        JwtConfig {
            secret: "test-secret-that-is-long-enough-for-hmac".to_string(),
            access_token_expiry_mins: 15,
            refresh_token_expiry_days: 7,
        }
    }

    #[test]
    fn test_issue_and_verify_pair() {
        let issuer = JwtIssuer::new(test_config());
        let tokens = issuer.issue(42, Role::Admin).expect("issue should succeed");

        assert_ne!(tokens.access_token, tokens.refresh_token);

        let access = issuer
            .verify(&tokens.access_token, TokenKind::Access)
            .expect("access token should verify");
        assert_eq!(access.sub, 42);
        assert_eq!(access.role, Role::Admin);
        assert_eq!(access.exp - access.iat, 15 * 60);

        let refresh = issuer
            .verify(&tokens.refresh_token, TokenKind::Refresh)
            .expect("refresh token should verify");
        assert_eq!(refresh.sub, 42);
        assert_eq!(refresh.exp, tokens.refresh_expires_at.timestamp());
        assert_ne!(access.jti, refresh.jti);
    }

    #[test]
    fn test_kinds_are_not_interchangeable() {
        let issuer = JwtIssuer::new(test_config());
        let tokens = issuer.issue(1, Role::Owner).unwrap();

        assert_matches!(
            issuer.verify(&tokens.refresh_token, TokenKind::Access),
            Err(CoreError::InvalidToken)
        );
        assert_matches!(
            issuer.verify(&tokens.access_token, TokenKind::Refresh),
            Err(CoreError::InvalidToken)
        );
    }

    #[test]
    fn test_expired_token_fails() {
        let issuer = JwtIssuer::new(test_config());

        // Ten seconds late is still late: no validation leeway.
        let now = Utc::now().timestamp();
        let claims = TokenClaims {
            sub: 1,
            role: Role::Owner,
            typ: TokenKind::Refresh,
            exp: now - 10,
            iat: now - 600,
            jti: Uuid::new_v4().to_string(),
        };
        let token = issuer.sign(&claims).unwrap();

        assert_matches!(
            issuer.verify(&token, TokenKind::Refresh),
            Err(CoreError::InvalidToken)
        );
    }

    #[test]
    fn test_different_secrets_fail() {
        let issuer_a = JwtIssuer::new(JwtConfig {
            secret: "secret-alpha".to_string(),
            ..test_config()
        });
        let issuer_b = JwtIssuer::new(JwtConfig {
            secret: "secret-bravo".to_string(),
            ..test_config()
        });

        let tokens = issuer_a.issue(1, Role::Owner).unwrap();
        assert_matches!(
            issuer_b.verify(&tokens.access_token, TokenKind::Access),
            Err(CoreError::InvalidToken)
        );
    }

    #[test]
    fn test_garbage_token_fails() {
        let issuer = JwtIssuer::new(test_config());
        assert_matches!(
            issuer.verify("not-a-real-token", TokenKind::Refresh),
            Err(CoreError::InvalidToken)
        );
    }

    #[test]
    fn test_config_from_lookup() {
        let lookup = |name: &str| match name {
            "JWT_SECRET" => Some("s3cret".to_string()),
            "JWT_REFRESH_EXPIRY_DAYS" => Some("30".to_string()),
            _ => None,
        };
        let config = JwtConfig::from_lookup(&lookup).unwrap();
        assert_eq!(config.secret, "s3cret");
        assert_eq!(config.access_token_expiry_mins, 15);
        assert_eq!(config.refresh_token_expiry_days, 30);

        let missing = |_: &str| None;
        assert_matches!(
            JwtConfig::from_lookup(&missing),
            Err(ConfigError::Missing("JWT_SECRET"))
        );
    }
}
