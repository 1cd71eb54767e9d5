use crate::types::DbId;

/// Domain-level error shared by every crate in the workspace.
///
/// The HTTP layer maps each variant to a status code; nothing here knows
/// about HTTP.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: DbId },

    #[error("Validation failed: {0}")]
    Validation(String),

    /// Unknown email or password mismatch. Deliberately does not say which.
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// Expired, forged, revoked or replayed token.
    #[error("Invalid token")]
    InvalidToken,

    #[error("Conflict: {0}")]
    Conflict(String),

    /// No usable authentication was presented.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Authenticated, but the role does not permit the operation.
    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Internal error: {0}")]
    Internal(String),
}
