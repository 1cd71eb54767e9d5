//! Credential store contract.
//!
//! The store owns every piece of durable auth state: user rows (identity,
//! password hash, role) and one session row per outstanding refresh token.
//! Email uniqueness is the store's job; implementations must report a
//! duplicate as [`CoreError::Conflict`] even when two registrations race.

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use utoipa::ToSchema;

use crate::error::CoreError;
use crate::patch::PatchFields;
use crate::roles::Role;
use crate::types::{DbId, Timestamp};

/// Columns a caller may change through a profile patch.
pub const PROFILE_FIELDS: &[&str] = &["name", "phone"];

/// Full user record, password hash included.
///
/// Never serialize this; hand out [`UserView`] instead.
#[derive(Debug, Clone)]
pub struct UserRecord {
    pub id: DbId,
    pub email: String,
    pub name: String,
    pub phone: Option<String>,
    pub password_hash: String,
    pub role: Role,
    pub last_login_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl UserRecord {
    pub fn view(&self) -> UserView {
        UserView {
            id: self.id,
            email: self.email.clone(),
            name: self.name.clone(),
            phone: self.phone.clone(),
            role: self.role,
            last_login_at: self.last_login_at,
            created_at: self.created_at,
        }
    }
}

/// Public user representation (no password hash).
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserView {
    #[schema(value_type = i64)]
    pub id: DbId,
    pub email: String,
    pub name: String,
    pub phone: Option<String>,
    pub role: Role,
    #[schema(value_type = Option<String>, format = DateTime)]
    pub last_login_at: Option<Timestamp>,
    #[schema(value_type = String, format = DateTime)]
    pub created_at: Timestamp,
}

/// Input for inserting a user. `email` is expected to be normalised already.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub name: String,
    pub password_hash: String,
    pub role: Role,
}

/// One outstanding refresh token, identified by the SHA-256 of the token.
#[derive(Debug, Clone)]
pub struct SessionRecord {
    pub id: DbId,
    pub user_id: DbId,
    pub refresh_token_hash: String,
    pub expires_at: Timestamp,
    pub is_revoked: bool,
    pub created_at: Timestamp,
}

#[derive(Debug, Clone)]
pub struct NewSession {
    pub user_id: DbId,
    pub refresh_token_hash: String,
    pub expires_at: Timestamp,
}

#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Look up a user by normalised email.
    async fn find_user_by_email(&self, email: &str) -> Result<Option<UserRecord>, CoreError>;

    async fn find_user_by_id(&self, id: DbId) -> Result<Option<UserRecord>, CoreError>;

    /// Insert a user. Fails with [`CoreError::Conflict`] if the email is taken.
    async fn create_user(&self, input: NewUser) -> Result<UserRecord, CoreError>;

    /// Replace the stored password hash. Returns `false` if the user is missing.
    async fn update_password(&self, id: DbId, password_hash: &str) -> Result<bool, CoreError>;

    /// Apply a profile patch (keys from [`PROFILE_FIELDS`] only).
    ///
    /// Returns `None` if the user is missing.
    async fn update_profile(
        &self,
        id: DbId,
        fields: &PatchFields,
    ) -> Result<Option<UserRecord>, CoreError>;

    /// Stamp `last_login_at` with the current time.
    async fn record_login(&self, id: DbId) -> Result<(), CoreError>;

    async fn create_session(&self, input: NewSession) -> Result<SessionRecord, CoreError>;

    /// Atomically revoke and return the active, unexpired session matching
    /// `refresh_token_hash`. At most one caller can consume a given session.
    async fn consume_session(
        &self,
        refresh_token_hash: &str,
    ) -> Result<Option<SessionRecord>, CoreError>;

    /// Look up a session by hash whatever its state.
    ///
    /// Revoked rows are kept until they expire, so a revoked match means the
    /// token was already rotated or logged out.
    async fn find_session(
        &self,
        refresh_token_hash: &str,
    ) -> Result<Option<SessionRecord>, CoreError>;

    /// Revoke every active session of a user, returning how many were revoked.
    async fn revoke_sessions(&self, user_id: DbId) -> Result<u64, CoreError>;

    /// Delete sessions past their expiry, returning how many were removed.
    async fn delete_expired_sessions(&self) -> Result<u64, CoreError>;

    /// Cheap liveness probe used by `/health`.
    async fn ping(&self) -> Result<(), CoreError>;
}

/// Check a profile patch before it reaches the store.
///
/// Only [`PROFILE_FIELDS`] are accepted, all values must be strings, and
/// `name` may not be cleared.
pub fn validate_profile_fields(fields: &PatchFields) -> Result<(), CoreError> {
    for (key, value) in fields {
        if !PROFILE_FIELDS.contains(&key.as_str()) {
            return Err(CoreError::Validation(format!("Unknown profile field: {key}")));
        }
        match (key.as_str(), value) {
            ("name", Value::Null) => {
                return Err(CoreError::Validation("name: cannot be null".into()));
            }
            ("name", Value::String(s)) if s.trim().is_empty() => {
                return Err(CoreError::Validation("name: cannot be empty".into()));
            }
            (_, Value::String(_)) | (_, Value::Null) => {}
            (_, _) => {
                return Err(CoreError::Validation(format!("{key}: must be a string")));
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use serde_json::json;

    use super::*;

    fn fields(value: Value) -> PatchFields {
        match value {
            Value::Object(map) => map,
            _ => unreachable!("test helper expects an object"),
        }
    }

    #[test]
    fn test_profile_patch_accepts_known_fields() {
        let patch = fields(json!({ "name": "Tom", "phone": null }));
        assert!(validate_profile_fields(&patch).is_ok());
    }

    #[test]
    fn test_profile_patch_rejects_unknown_field() {
        let patch = fields(json!({ "role": "admin" }));
        assert_matches!(
            validate_profile_fields(&patch),
            Err(CoreError::Validation(msg)) if msg.contains("role")
        );
    }

    #[test]
    fn test_profile_patch_rejects_null_name() {
        let patch = fields(json!({ "name": null }));
        assert_matches!(validate_profile_fields(&patch), Err(CoreError::Validation(_)));
    }

    #[test]
    fn test_profile_patch_allows_empty_phone() {
        let patch = fields(json!({ "phone": "" }));
        assert!(validate_profile_fields(&patch).is_ok());
    }

    #[test]
    fn test_view_omits_password_hash() {
        let now = chrono::Utc::now();
        let record = UserRecord {
            id: 7,
            email: "tom@cats.io".into(),
            name: "Tom".into(),
            phone: None,
            password_hash: "$argon2id$secret".into(),
            role: Role::Owner,
            last_login_at: None,
            created_at: now,
            updated_at: now,
        };
        let json = serde_json::to_value(record.view()).unwrap();
        assert!(json.get("passwordHash").is_none());
        assert!(!json.to_string().contains("argon2id"));
        assert_eq!(json["email"], "tom@cats.io");
        assert_eq!(json["role"], "owner");
    }
}
