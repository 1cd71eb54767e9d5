//! Role-based access control (RBAC) extractors.
//!
//! Each extractor wraps [`AuthUser`] and asks [`is_authorized`] whether the
//! token's role may proceed. The check runs before the handler body.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use cats_core::error::CoreError;
use cats_core::roles::{is_authorized, CREDENTIAL_MANAGERS};

use super::auth::AuthUser;
use crate::error::AppError;
use crate::state::AppState;

/// Requires `owner` or `admin` role. Rejects with 403 Forbidden otherwise.
///
/// ```ignore
/// async fn change_password(RequireOwnerOrAdmin(user): RequireOwnerOrAdmin) -> AppResult<Json<()>> {
///     Ok(Json(()))
/// }
/// ```
pub struct RequireOwnerOrAdmin(pub AuthUser);

impl FromRequestParts<AppState> for RequireOwnerOrAdmin {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = AuthUser::from_request_parts(parts, state).await?;
        if !is_authorized(user.role, CREDENTIAL_MANAGERS) {
            tracing::debug!(user_id = user.user_id, role = %user.role, "Role not permitted");
            return Err(AppError::Core(CoreError::Forbidden(
                "Owner or Admin role required".into(),
            )));
        }
        Ok(RequireOwnerOrAdmin(user))
    }
}

/// Requires any authenticated user (any valid role).
///
/// Functionally equivalent to [`AuthUser`] but named explicitly for use in
/// route definitions where the intent "this route requires authentication"
/// should be self-documenting.
pub struct RequireAuth(pub AuthUser);

impl FromRequestParts<AppState> for RequireAuth {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = AuthUser::from_request_parts(parts, state).await?;
        Ok(RequireAuth(user))
    }
}
