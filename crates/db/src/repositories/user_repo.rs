//! Repository for the `users` table.

use cats_core::patch::PatchFields;
use cats_core::types::DbId;
use serde_json::Value;
use sqlx::{PgPool, Postgres, QueryBuilder};

use crate::models::user::{CreateUser, User};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, email, name, phone, password_hash, role, \
                       last_login_at, created_at, updated_at";

/// Provides CRUD operations for users.
pub struct UserRepo;

impl UserRepo {
    /// Insert a new user, returning the created row.
    ///
    /// A duplicate email fails with a `uq_users_email` unique violation.
    pub async fn create(pool: &PgPool, input: &CreateUser) -> Result<User, sqlx::Error> {
        let query = format!(
            "INSERT INTO users (email, name, password_hash, role)
             VALUES ($1, $2, $3, $4)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, User>(&query)
            .bind(&input.email)
            .bind(&input.name)
            .bind(&input.password_hash)
            .bind(input.role.as_str())
            .fetch_one(pool)
            .await
    }

    /// Find a user by internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<User>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM users WHERE id = $1");
        sqlx::query_as::<_, User>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find a user by email. Callers pass the normalised (lowercase) form.
    pub async fn find_by_email(pool: &PgPool, email: &str) -> Result<Option<User>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM users WHERE email = $1");
        sqlx::query_as::<_, User>(&query)
            .bind(email)
            .fetch_optional(pool)
            .await
    }

    /// Apply a partial update built from supplied fields only.
    ///
    /// Keys are column names and must already be checked against the allowed
    /// profile columns. Every profile column is `TEXT`, so values bind as
    /// `Option<String>`. An empty patch just re-reads the row.
    pub async fn update_profile(
        pool: &PgPool,
        id: DbId,
        fields: &PatchFields,
    ) -> Result<Option<User>, sqlx::Error> {
        if fields.is_empty() {
            return Self::find_by_id(pool, id).await;
        }

        let mut builder = QueryBuilder::<Postgres>::new("UPDATE users SET ");
        let mut assignments = builder.separated(", ");
        for (column, value) in fields {
            let text = match value {
                Value::String(s) => Some(s.clone()),
                _ => None,
            };
            assignments.push(column);
            assignments.push_unseparated(" = ");
            assignments.push_bind_unseparated(text);
        }
        builder.push(" WHERE id = ");
        builder.push_bind(id);
        builder.push(format!(" RETURNING {COLUMNS}"));

        builder.build_query_as::<User>().fetch_optional(pool).await
    }

    /// Set `last_login_at` to now.
    pub async fn record_successful_login(pool: &PgPool, id: DbId) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE users SET last_login_at = NOW() WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(())
    }

    /// Update a user's password hash. Returns `true` if the row was updated.
    pub async fn update_password(
        pool: &PgPool,
        id: DbId,
        password_hash: &str,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("UPDATE users SET password_hash = $2 WHERE id = $1")
            .bind(id)
            .bind(password_hash)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
