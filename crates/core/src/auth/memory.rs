//! In-process [`CredentialStore`] backed by maps behind a [`RwLock`].
//!
//! Mirrors the PostgreSQL store's semantics (unique email, single-use session
//! consumption, expiry filtering) so the service and HTTP layers can be tested
//! without a database.

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::Utc;
use serde_json::Value;
use tokio::sync::RwLock;

use super::store::{
    validate_profile_fields, CredentialStore, NewSession, NewUser, SessionRecord, UserRecord,
};
use crate::error::CoreError;
use crate::patch::PatchFields;
use crate::types::DbId;

#[derive(Default)]
struct Inner {
    users: BTreeMap<DbId, UserRecord>,
    sessions: Vec<SessionRecord>,
    next_user_id: DbId,
    next_session_id: DbId,
}

#[derive(Default)]
pub struct InMemoryCredentialStore {
    inner: RwLock<Inner>,
}

impl InMemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of unrevoked, unexpired sessions held by `user_id`.
    pub async fn active_sessions(&self, user_id: DbId) -> usize {
        let now = Utc::now();
        self.inner
            .read()
            .await
            .sessions
            .iter()
            .filter(|s| s.user_id == user_id && !s.is_revoked && s.expires_at > now)
            .count()
    }
}

#[async_trait]
impl CredentialStore for InMemoryCredentialStore {
    async fn find_user_by_email(&self, email: &str) -> Result<Option<UserRecord>, CoreError> {
        let inner = self.inner.read().await;
        Ok(inner.users.values().find(|u| u.email == email).cloned())
    }

    async fn find_user_by_id(&self, id: DbId) -> Result<Option<UserRecord>, CoreError> {
        Ok(self.inner.read().await.users.get(&id).cloned())
    }

    async fn create_user(&self, input: NewUser) -> Result<UserRecord, CoreError> {
        let mut inner = self.inner.write().await;
        if inner.users.values().any(|u| u.email == input.email) {
            return Err(CoreError::Conflict(
                "Duplicate value violates unique constraint: uq_users_email".into(),
            ));
        }

        inner.next_user_id += 1;
        let now = Utc::now();
        let user = UserRecord {
            id: inner.next_user_id,
            email: input.email,
            name: input.name,
            phone: None,
            password_hash: input.password_hash,
            role: input.role,
            last_login_at: None,
            created_at: now,
            updated_at: now,
        };
        inner.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn update_password(&self, id: DbId, password_hash: &str) -> Result<bool, CoreError> {
        let mut inner = self.inner.write().await;
        match inner.users.get_mut(&id) {
            Some(user) => {
                user.password_hash = password_hash.to_string();
                user.updated_at = Utc::now();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn update_profile(
        &self,
        id: DbId,
        fields: &PatchFields,
    ) -> Result<Option<UserRecord>, CoreError> {
        validate_profile_fields(fields)?;

        let mut inner = self.inner.write().await;
        let Some(user) = inner.users.get_mut(&id) else {
            return Ok(None);
        };

        for (key, value) in fields {
            let text = match value {
                Value::String(s) => Some(s.clone()),
                _ => None,
            };
            match key.as_str() {
                "name" => user.name = text.unwrap_or_default(),
                "phone" => user.phone = text,
                _ => {}
            }
        }
        if !fields.is_empty() {
            user.updated_at = Utc::now();
        }
        Ok(Some(user.clone()))
    }

    async fn record_login(&self, id: DbId) -> Result<(), CoreError> {
        if let Some(user) = self.inner.write().await.users.get_mut(&id) {
            user.last_login_at = Some(Utc::now());
        }
        Ok(())
    }

    async fn create_session(&self, input: NewSession) -> Result<SessionRecord, CoreError> {
        let now = Utc::now();
        let mut inner = self.inner.write().await;
        // Expired rows can no longer be consumed or replayed.
        inner.sessions.retain(|s| s.expires_at > now);
        inner.next_session_id += 1;
        let session = SessionRecord {
            id: inner.next_session_id,
            user_id: input.user_id,
            refresh_token_hash: input.refresh_token_hash,
            expires_at: input.expires_at,
            is_revoked: false,
            created_at: now,
        };
        inner.sessions.push(session.clone());
        Ok(session)
    }

    async fn consume_session(
        &self,
        refresh_token_hash: &str,
    ) -> Result<Option<SessionRecord>, CoreError> {
        let now = Utc::now();
        let mut inner = self.inner.write().await;
        let session = inner.sessions.iter_mut().find(|s| {
            s.refresh_token_hash == refresh_token_hash && !s.is_revoked && s.expires_at > now
        });
        Ok(session.map(|s| {
            s.is_revoked = true;
            s.clone()
        }))
    }

    async fn find_session(
        &self,
        refresh_token_hash: &str,
    ) -> Result<Option<SessionRecord>, CoreError> {
        let inner = self.inner.read().await;
        Ok(inner
            .sessions
            .iter()
            .find(|s| s.refresh_token_hash == refresh_token_hash)
            .cloned())
    }

    async fn revoke_sessions(&self, user_id: DbId) -> Result<u64, CoreError> {
        let mut inner = self.inner.write().await;
        let mut revoked = 0;
        for session in inner
            .sessions
            .iter_mut()
            .filter(|s| s.user_id == user_id && !s.is_revoked)
        {
            session.is_revoked = true;
            revoked += 1;
        }
        Ok(revoked)
    }

    async fn delete_expired_sessions(&self) -> Result<u64, CoreError> {
        let now = Utc::now();
        let mut inner = self.inner.write().await;
        let before = inner.sessions.len();
        inner.sessions.retain(|s| s.expires_at > now);
        Ok((before - inner.sessions.len()) as u64)
    }

    async fn ping(&self) -> Result<(), CoreError> {
        Ok(())
    }
}
