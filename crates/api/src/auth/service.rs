//! Authentication service: login, refresh, registration, password change.
//!
//! The service is stateless; everything durable goes through the
//! [`CredentialStore`] and every token through the [`TokenIssuer`]. Both are
//! injected as trait objects so tests can run against the in-memory store.

use std::sync::{Arc, OnceLock};

use cats_core::auth::{
    hash_refresh_token, CredentialStore, IssuedTokens, NewSession, NewUser, TokenIssuer,
    TokenKind, UserView,
};
use cats_core::error::CoreError;
use cats_core::patch::PatchFields;
use cats_core::roles::Role;
use cats_core::types::DbId;
use cats_core::validation::normalize_email;

use super::password::{hash_password, verify_password, PasswordPolicy};

/// Fresh access + refresh token pair handed back to the caller.
#[derive(Debug, Clone)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

/// Validated registration payload.
#[derive(Debug, Clone)]
pub struct RegisterInput {
    pub email: String,
    pub password: String,
    pub name: String,
}

pub struct AuthService {
    store: Arc<dyn CredentialStore>,
    tokens: Arc<dyn TokenIssuer>,
    policy: PasswordPolicy,
}

impl AuthService {
    pub fn new(
        store: Arc<dyn CredentialStore>,
        tokens: Arc<dyn TokenIssuer>,
        policy: PasswordPolicy,
    ) -> Self {
        Self {
            store,
            tokens,
            policy,
        }
    }

    /// Exchange email + password for a token pair.
    ///
    /// Unknown email and wrong password are indistinguishable to the caller,
    /// including in timing: an unknown email still pays for one verification.
    pub async fn login(&self, email: &str, password: &str) -> Result<TokenPair, CoreError> {
        let email = normalize_email(email);
        let user = self.store.find_user_by_email(&email).await?;

        let Some(user) = user else {
            verify_blocking(password.to_owned(), dummy_hash()?.to_owned()).await?;
            tracing::debug!("Login rejected: unknown email");
            return Err(CoreError::InvalidCredentials);
        };

        if !verify_blocking(password.to_owned(), user.password_hash.clone()).await? {
            tracing::debug!(user_id = user.id, "Login rejected: password mismatch");
            return Err(CoreError::InvalidCredentials);
        }

        self.store.record_login(user.id).await?;
        let pair = self.start_session(user.id, user.role).await?;
        tracing::info!(user_id = user.id, "User logged in");
        Ok(pair)
    }

    /// Rotate a refresh token into a new pair.
    ///
    /// The presented token's session is consumed. A correctly signed token
    /// whose session is already revoked is a replay, so every session of that
    /// user is revoked. An expired or unknown session is simply rejected.
    pub async fn refresh(&self, refresh_token: &str) -> Result<TokenPair, CoreError> {
        let claims = self.tokens.verify(refresh_token, TokenKind::Refresh)?;

        let hash = hash_refresh_token(refresh_token);
        let Some(session) = self.store.consume_session(&hash).await? else {
            let replayed = self
                .store
                .find_session(&hash)
                .await?
                .is_some_and(|s| s.is_revoked);
            if replayed {
                let revoked = self.store.revoke_sessions(claims.sub).await?;
                tracing::warn!(
                    user_id = claims.sub,
                    revoked,
                    "Refresh token reuse detected, revoked all sessions"
                );
            } else {
                tracing::debug!(user_id = claims.sub, "Refresh rejected: no live session");
            }
            return Err(CoreError::InvalidToken);
        };

        // The role may have changed since the token was minted.
        let user = self
            .store
            .find_user_by_id(session.user_id)
            .await?
            .ok_or(CoreError::InvalidToken)?;

        let pair = self.start_session(user.id, user.role).await?;
        tracing::debug!(user_id = user.id, "Refresh token rotated");
        Ok(pair)
    }

    /// Create an account with the `owner` role.
    pub async fn register(&self, input: RegisterInput) -> Result<UserView, CoreError> {
        let email = normalize_email(&input.email);
        if self.store.find_user_by_email(&email).await?.is_some() {
            return Err(CoreError::Conflict(format!(
                "A user with email {email} already exists"
            )));
        }
        self.policy
            .check(&input.password)
            .map_err(CoreError::Validation)?;

        let password_hash = hash_blocking(input.password).await?;
        // A concurrent registration can still win the race; the store reports
        // that as a Conflict too.
        let user = self
            .store
            .create_user(NewUser {
                email,
                name: input.name.trim().to_string(),
                password_hash,
                role: Role::Owner,
            })
            .await?;

        tracing::info!(user_id = user.id, "User registered");
        Ok(user.view())
    }

    /// Replace the password after checking the current one.
    ///
    /// Every outstanding refresh token of the user is revoked on success.
    pub async fn change_password(
        &self,
        user_id: DbId,
        old_password: &str,
        new_password: &str,
    ) -> Result<(), CoreError> {
        let user = self
            .store
            .find_user_by_id(user_id)
            .await?
            .ok_or(CoreError::NotFound {
                entity: "User",
                id: user_id,
            })?;

        if !verify_blocking(old_password.to_owned(), user.password_hash).await? {
            tracing::debug!(user_id, "Password change rejected: old password mismatch");
            return Err(CoreError::InvalidCredentials);
        }
        self.policy
            .check(new_password)
            .map_err(CoreError::Validation)?;

        let new_hash = hash_blocking(new_password.to_owned()).await?;
        if !self.store.update_password(user_id, &new_hash).await? {
            return Err(CoreError::NotFound {
                entity: "User",
                id: user_id,
            });
        }
        let revoked = self.store.revoke_sessions(user_id).await?;
        tracing::info!(user_id, revoked, "Password changed");
        Ok(())
    }

    /// Revoke every session of the user. Returns how many were revoked.
    pub async fn logout(&self, user_id: DbId) -> Result<u64, CoreError> {
        let revoked = self.store.revoke_sessions(user_id).await?;
        tracing::info!(user_id, revoked, "User logged out");
        Ok(revoked)
    }

    pub async fn profile(&self, user_id: DbId) -> Result<UserView, CoreError> {
        self.store
            .find_user_by_id(user_id)
            .await?
            .map(|u| u.view())
            .ok_or(CoreError::NotFound {
                entity: "User",
                id: user_id,
            })
    }

    /// Apply a partial profile update. Keys absent from `fields` are untouched.
    pub async fn update_profile(
        &self,
        user_id: DbId,
        fields: PatchFields,
    ) -> Result<UserView, CoreError> {
        let user = self
            .store
            .update_profile(user_id, &fields)
            .await?
            .ok_or(CoreError::NotFound {
                entity: "User",
                id: user_id,
            })?;
        tracing::debug!(user_id, fields = fields.len(), "Profile updated");
        Ok(user.view())
    }

    /// Mint a pair and persist the refresh token's session.
    async fn start_session(&self, user_id: DbId, role: Role) -> Result<TokenPair, CoreError> {
        let IssuedTokens {
            access_token,
            refresh_token,
            refresh_expires_at,
            ..
        } = self.tokens.issue(user_id, role)?;

        self.store
            .create_session(NewSession {
                user_id,
                refresh_token_hash: hash_refresh_token(&refresh_token),
                expires_at: refresh_expires_at,
            })
            .await?;

        Ok(TokenPair {
            access_token,
            refresh_token,
        })
    }
}

/// A valid Argon2id hash used to burn the same verification cost for unknown emails.
fn dummy_hash() -> Result<&'static str, CoreError> {
    static DUMMY: OnceLock<String> = OnceLock::new();
    if let Some(hash) = DUMMY.get() {
        return Ok(hash);
    }
    let hash = hash_password("cats-dummy-password")
        .map_err(|e| CoreError::Internal(format!("Password hashing error: {e}")))?;
    Ok(DUMMY.get_or_init(|| hash))
}

async fn hash_blocking(password: String) -> Result<String, CoreError> {
    tokio::task::spawn_blocking(move || hash_password(&password))
        .await
        .map_err(|e| CoreError::Internal(format!("Hashing task failed: {e}")))?
        .map_err(|e| CoreError::Internal(format!("Password hashing error: {e}")))
}

async fn verify_blocking(password: String, hash: String) -> Result<bool, CoreError> {
    tokio::task::spawn_blocking(move || verify_password(&password, &hash))
        .await
        .map_err(|e| CoreError::Internal(format!("Verification task failed: {e}")))?
        .map_err(|e| CoreError::Internal(format!("Password verification error: {e}")))
}
