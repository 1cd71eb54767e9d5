//! User row model and DTOs.

use cats_core::auth::UserRecord;
use cats_core::error::CoreError;
use cats_core::roles::Role;
use cats_core::types::{DbId, Timestamp};
use sqlx::FromRow;

/// Full user row from the `users` table.
///
/// Contains the password hash -- convert to [`UserRecord`] and hand out
/// its `view()` for anything external-facing.
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: DbId,
    pub email: String,
    pub name: String,
    pub phone: Option<String>,
    pub password_hash: String,
    pub role: String,
    pub last_login_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl TryFrom<User> for UserRecord {
    type Error = CoreError;

    fn try_from(row: User) -> Result<Self, Self::Error> {
        let role: Role = row.role.parse().map_err(|_| {
            CoreError::Internal(format!("User {} has unknown role '{}'", row.id, row.role))
        })?;
        Ok(UserRecord {
            id: row.id,
            email: row.email,
            name: row.name,
            phone: row.phone,
            password_hash: row.password_hash,
            role,
            last_login_at: row.last_login_at,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// DTO for creating a new user.
#[derive(Debug)]
pub struct CreateUser {
    pub email: String,
    pub name: String,
    pub password_hash: String,
    pub role: Role,
}
