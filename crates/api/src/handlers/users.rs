//! Handlers for the `/users` resource (current user's profile).

use axum::extract::State;
use axum::Json;
use cats_core::auth::UserView;
use cats_core::patch::{create_patch_fields, Patch};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::{Validate, ValidationError};

use crate::error::AppResult;
use crate::extract::ValidatedJson;
use crate::middleware::rbac::RequireAuth;
use crate::response::ErrorResponse;
use crate::state::AppState;

/// Request body for `PATCH /users/me`. Omitted fields are left unchanged.
#[derive(Debug, Deserialize, Serialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileRequest {
    #[serde(default, skip_serializing_if = "Patch::is_absent")]
    #[validate(custom(function = "validate_name"))]
    #[schema(value_type = Option<String>, example = "Felix")]
    pub name: Patch<String>,
    /// Send `null` to clear.
    #[serde(default, skip_serializing_if = "Patch::is_absent")]
    #[validate(custom(function = "validate_phone"))]
    #[schema(value_type = Option<String>, example = "555-0100")]
    pub phone: Patch<String>,
}

fn validate_name(name: &Patch<String>) -> Result<(), ValidationError> {
    match name {
        Patch::Null => Err(ValidationError::new("null").with_message("cannot be null".into())),
        Patch::Value(v) if v.trim().is_empty() || v.chars().count() > 100 => {
            Err(ValidationError::new("length").with_message("must be 1-100 characters".into()))
        }
        _ => Ok(()),
    }
}

fn validate_phone(phone: &Patch<String>) -> Result<(), ValidationError> {
    match phone.as_value() {
        Some(v) if v.chars().count() > 32 => {
            Err(ValidationError::new("length").with_message("must be at most 32 characters".into()))
        }
        _ => Ok(()),
    }
}

/// Get the current user's profile
#[utoipa::path(
    get,
    path = "/v1/users/me",
    tag = "users",
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Current user", body = UserView),
        (status = 401, description = "Unauthenticated", body = ErrorResponse),
    )
)]
pub async fn get_me(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> AppResult<Json<UserView>> {
    Ok(Json(state.auth.profile(user.user_id).await?))
}

/// Partially update the current user's profile
#[utoipa::path(
    patch,
    path = "/v1/users/me",
    tag = "users",
    request_body = UpdateProfileRequest,
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Updated user", body = UserView),
        (status = 400, description = "Bad Request", body = ErrorResponse),
        (status = 401, description = "Unauthenticated", body = ErrorResponse),
    )
)]
pub async fn update_me(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    ValidatedJson(input): ValidatedJson<UpdateProfileRequest>,
) -> AppResult<Json<UserView>> {
    let fields = create_patch_fields(&input)?;
    Ok(Json(state.auth.update_profile(user.user_id, fields).await?))
}
