//! Token issuer contract and the claims shared by access and refresh tokens.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::error::CoreError;
use crate::roles::Role;
use crate::types::{DbId, Timestamp};

/// Which half of a credential pair a token is.
///
/// Carried in the `typ` claim so a refresh token can never pass as an access
/// token and vice versa.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    Access,
    Refresh,
}

/// Claims embedded in every token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenClaims {
    /// Subject -- the user's internal database id.
    pub sub: DbId,
    pub role: Role,
    pub typ: TokenKind,
    /// Expiration time (UTC Unix timestamp).
    pub exp: i64,
    /// Issued-at time (UTC Unix timestamp).
    pub iat: i64,
    /// Unique token identifier, so two tokens minted in the same second differ.
    pub jti: String,
}

/// A freshly minted credential pair plus the metadata the service persists.
#[derive(Debug, Clone)]
pub struct IssuedTokens {
    pub access_token: String,
    pub refresh_token: String,
    pub refresh_expires_at: Timestamp,
}

pub trait TokenIssuer: Send + Sync {
    fn issue(&self, user_id: DbId, role: Role) -> Result<IssuedTokens, CoreError>;

    /// Verify signature, expiry and kind.
    ///
    /// Every failure is reported as [`CoreError::InvalidToken`].
    fn verify(&self, token: &str, kind: TokenKind) -> Result<TokenClaims, CoreError>;
}

/// SHA-256 hex digest of a refresh token.
///
/// Only this digest is persisted, so a leaked session table cannot be replayed.
pub fn hash_refresh_token(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    format!("{:x}", hasher.finalize())
}
