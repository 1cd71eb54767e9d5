//! PostgreSQL-backed [`CredentialStore`].

use async_trait::async_trait;
use cats_core::auth::store::validate_profile_fields;
use cats_core::auth::{CredentialStore, NewSession, NewUser, SessionRecord, UserRecord};
use cats_core::error::CoreError;
use cats_core::patch::PatchFields;
use cats_core::types::DbId;

use crate::models::session::CreateSession;
use crate::models::user::CreateUser;
use crate::repositories::{SessionRepo, UserRepo};
use crate::DbPool;

/// PostgreSQL unique-violation SQLSTATE.
const UNIQUE_VIOLATION: &str = "23505";

#[derive(Clone)]
pub struct PgCredentialStore {
    pool: DbPool,
}

impl PgCredentialStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

/// Translate a sqlx error into the domain taxonomy.
///
/// - Unique violations on a `uq_`-prefixed constraint become [`CoreError::Conflict`].
/// - Everything else becomes [`CoreError::Internal`]; the HTTP layer sanitizes it.
pub fn map_db_error(err: sqlx::Error) -> CoreError {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.code().as_deref() == Some(UNIQUE_VIOLATION) {
            let constraint = db_err.constraint().unwrap_or("unknown");
            if constraint.starts_with("uq_") {
                return CoreError::Conflict(format!(
                    "Duplicate value violates unique constraint: {constraint}"
                ));
            }
        }
    }
    tracing::error!(error = %err, "Database error");
    CoreError::Internal(format!("Database error: {err}"))
}

#[async_trait]
impl CredentialStore for PgCredentialStore {
    async fn find_user_by_email(&self, email: &str) -> Result<Option<UserRecord>, CoreError> {
        UserRepo::find_by_email(&self.pool, email)
            .await
            .map_err(map_db_error)?
            .map(UserRecord::try_from)
            .transpose()
    }

    async fn find_user_by_id(&self, id: DbId) -> Result<Option<UserRecord>, CoreError> {
        UserRepo::find_by_id(&self.pool, id)
            .await
            .map_err(map_db_error)?
            .map(UserRecord::try_from)
            .transpose()
    }

    async fn create_user(&self, input: NewUser) -> Result<UserRecord, CoreError> {
        let create = CreateUser {
            email: input.email,
            name: input.name,
            password_hash: input.password_hash,
            role: input.role,
        };
        UserRepo::create(&self.pool, &create)
            .await
            .map_err(map_db_error)?
            .try_into()
    }

    async fn update_password(&self, id: DbId, password_hash: &str) -> Result<bool, CoreError> {
        UserRepo::update_password(&self.pool, id, password_hash)
            .await
            .map_err(map_db_error)
    }

    async fn update_profile(
        &self,
        id: DbId,
        fields: &PatchFields,
    ) -> Result<Option<UserRecord>, CoreError> {
        // Keys become column names in the UPDATE; never let an unchecked key through.
        validate_profile_fields(fields)?;
        UserRepo::update_profile(&self.pool, id, fields)
            .await
            .map_err(map_db_error)?
            .map(UserRecord::try_from)
            .transpose()
    }

    async fn record_login(&self, id: DbId) -> Result<(), CoreError> {
        UserRepo::record_successful_login(&self.pool, id)
            .await
            .map_err(map_db_error)
    }

    async fn create_session(&self, input: NewSession) -> Result<SessionRecord, CoreError> {
        let create = CreateSession {
            user_id: input.user_id,
            refresh_token_hash: input.refresh_token_hash,
            expires_at: input.expires_at,
        };
        SessionRepo::create(&self.pool, &create)
            .await
            .map(SessionRecord::from)
            .map_err(map_db_error)
    }

    async fn consume_session(
        &self,
        refresh_token_hash: &str,
    ) -> Result<Option<SessionRecord>, CoreError> {
        SessionRepo::consume_by_refresh_token_hash(&self.pool, refresh_token_hash)
            .await
            .map(|row| row.map(SessionRecord::from))
            .map_err(map_db_error)
    }

    async fn find_session(
        &self,
        refresh_token_hash: &str,
    ) -> Result<Option<SessionRecord>, CoreError> {
        SessionRepo::find_by_refresh_token_hash(&self.pool, refresh_token_hash)
            .await
            .map(|row| row.map(SessionRecord::from))
            .map_err(map_db_error)
    }

    async fn revoke_sessions(&self, user_id: DbId) -> Result<u64, CoreError> {
        SessionRepo::revoke_all_for_user(&self.pool, user_id)
            .await
            .map_err(map_db_error)
    }

    async fn delete_expired_sessions(&self) -> Result<u64, CoreError> {
        SessionRepo::cleanup_expired(&self.pool)
            .await
            .map_err(map_db_error)
    }

    async fn ping(&self) -> Result<(), CoreError> {
        crate::health_check(&self.pool).await.map_err(map_db_error)
    }
}
