//! Request body extractor that runs `validator` rules before the handler.

use axum::extract::rejection::JsonRejection;
use axum::extract::{FromRequest, Request};
use axum::Json;
use cats_core::error::CoreError;
use cats_core::validation::validation_message;
use serde::de::DeserializeOwned;
use validator::Validate;

use crate::error::AppError;

/// JSON body that has been deserialized *and* validated.
///
/// - Unparseable bodies or a missing `Content-Type` reject with 400 `BAD_REQUEST`.
/// - Rule violations reject with 400 `VALIDATION_ERROR`, listing each field.
///
/// ```ignore
/// async fn login(ValidatedJson(body): ValidatedJson<LoginRequest>) -> AppResult<...> { ... }
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct ValidatedJson<T>(pub T);

impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection: JsonRejection| AppError::BadRequest(rejection.body_text()))?;

        value
            .validate()
            .map_err(|errors| CoreError::Validation(validation_message(&errors)))?;

        Ok(ValidatedJson(value))
    }
}
