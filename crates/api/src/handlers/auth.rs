//! Handlers for the `/auth` resource (login, refresh, register, change-password, logout).

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use cats_core::auth::UserView;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::auth::service::{RegisterInput, TokenPair};
use crate::error::AppResult;
use crate::extract::ValidatedJson;
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::RequireOwnerOrAdmin;
use crate::response::{ErrorResponse, MessageResponse};
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Request body for `POST /auth/login`.
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    #[validate(email(message = "must be a valid email"))]
    #[schema(example = "tom@cats.io")]
    pub email: String,
    #[validate(length(min = 1, message = "must not be empty"))]
    pub password: String,
}

/// Request body for `POST /auth/refresh`.
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RefreshRequest {
    #[validate(length(min = 1, message = "must not be empty"))]
    pub refresh_token: String,
}

/// Request body for `POST /auth/register`.
///
/// Password length is checked by the service against the configured policy.
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    #[validate(email(message = "must be a valid email"))]
    #[schema(example = "tom@cats.io")]
    pub email: String,
    #[validate(length(min = 1, message = "must not be empty"))]
    pub password: String,
    #[validate(length(min = 1, max = 100, message = "must be 1-100 characters"))]
    #[schema(example = "Tom")]
    pub name: String,
}

/// Request body for `POST /auth/change-password`.
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    #[validate(length(min = 1, message = "must not be empty"))]
    pub old_password: String,
    #[validate(length(min = 1, message = "must not be empty"))]
    pub new_password: String,
}

/// Token pair returned by login and refresh.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub access_token: String,
    pub refresh_token: String,
}

impl From<TokenPair> for AuthResponse {
    fn from(pair: TokenPair) -> Self {
        Self {
            access_token: pair.access_token,
            refresh_token: pair.refresh_token,
        }
    }
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// Authenticate into System
#[utoipa::path(
    post,
    path = "/v1/auth/login",
    tag = "auth",
    request_body = LoginRequest,
    responses(
        (status = 201, description = "Login Successful", body = AuthResponse),
        (status = 400, description = "Bad Request", body = ErrorResponse),
        (status = 403, description = "Invalid Credentials", body = ErrorResponse),
    )
)]
pub async fn login(
    State(state): State<AppState>,
    ValidatedJson(input): ValidatedJson<LoginRequest>,
) -> AppResult<(StatusCode, Json<AuthResponse>)> {
    let pair = state.auth.login(&input.email, &input.password).await?;
    Ok((StatusCode::CREATED, Json(pair.into())))
}

/// Refresh Tokens
#[utoipa::path(
    post,
    path = "/v1/auth/refresh",
    tag = "auth",
    request_body = RefreshRequest,
    responses(
        (status = 201, description = "Refresh Token Successful", body = AuthResponse),
        (status = 400, description = "Bad Request", body = ErrorResponse),
        (status = 403, description = "Invalid Refresh Token", body = ErrorResponse),
    )
)]
pub async fn refresh(
    State(state): State<AppState>,
    ValidatedJson(input): ValidatedJson<RefreshRequest>,
) -> AppResult<(StatusCode, Json<AuthResponse>)> {
    let pair = state.auth.refresh(&input.refresh_token).await?;
    Ok((StatusCode::CREATED, Json(pair.into())))
}

/// Register Owner
#[utoipa::path(
    post,
    path = "/v1/auth/register",
    tag = "auth",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Register Owner Successful", body = UserView),
        (status = 400, description = "Bad Request", body = ErrorResponse),
        (status = 409, description = "Conflict with Email", body = ErrorResponse),
    )
)]
pub async fn register(
    State(state): State<AppState>,
    ValidatedJson(input): ValidatedJson<RegisterRequest>,
) -> AppResult<(StatusCode, Json<UserView>)> {
    let user = state
        .auth
        .register(RegisterInput {
            email: input.email,
            password: input.password,
            name: input.name,
        })
        .await?;
    Ok((StatusCode::CREATED, Json(user)))
}

/// Change current user password
///
/// Restricted to the `owner` and `admin` roles. Revokes every refresh token
/// of the user.
#[utoipa::path(
    post,
    path = "/v1/auth/change-password",
    tag = "auth",
    request_body = ChangePasswordRequest,
    security(("bearer" = [])),
    responses(
        (status = 201, description = "Password changed successfully", body = MessageResponse),
        (status = 400, description = "Bad Request", body = ErrorResponse),
        (status = 401, description = "Unauthenticated", body = ErrorResponse),
        (status = 403, description = "Forbidden or Invalid Credentials", body = ErrorResponse),
    )
)]
pub async fn change_password(
    State(state): State<AppState>,
    RequireOwnerOrAdmin(user): RequireOwnerOrAdmin,
    ValidatedJson(input): ValidatedJson<ChangePasswordRequest>,
) -> AppResult<(StatusCode, Json<MessageResponse>)> {
    state
        .auth
        .change_password(user.user_id, &input.old_password, &input.new_password)
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(MessageResponse::new("Password changed successfully")),
    ))
}

/// Revoke all sessions of the current user
#[utoipa::path(
    post,
    path = "/v1/auth/logout",
    tag = "auth",
    security(("bearer" = [])),
    responses(
        (status = 204, description = "Logged out"),
        (status = 401, description = "Unauthenticated", body = ErrorResponse),
    )
)]
pub async fn logout(State(state): State<AppState>, auth_user: AuthUser) -> AppResult<StatusCode> {
    state.auth.logout(auth_user.user_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
