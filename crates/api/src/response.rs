//! Shared response bodies for API handlers.

use serde::Serialize;
use utoipa::ToSchema;

/// `{ "message": ... }` body for operations with nothing else to return.
#[derive(Debug, Serialize, ToSchema)]
pub struct MessageResponse {
    #[schema(example = "Password changed successfully")]
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Error body produced by [`AppError`](crate::error::AppError).
///
/// Only used to describe error responses in the OpenAPI document.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    #[schema(example = "Invalid credentials")]
    pub error: String,
    #[schema(example = "INVALID_CREDENTIALS")]
    pub code: String,
}
