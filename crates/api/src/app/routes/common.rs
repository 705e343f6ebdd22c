use axum::Json;
use axum::extract::rejection::JsonRejection;

use fintrack_core::Issue;

use crate::app::errors::ApiError;

/// Unwrap a JSON body extractor, folding malformed bodies into the
/// validation envelope instead of axum's default rejection.
pub fn parse_body<T>(body: Result<Json<T>, JsonRejection>) -> Result<T, ApiError> {
    match body {
        Ok(Json(value)) => Ok(value),
        Err(rejection) => Err(ApiError::validation(vec![Issue::new(
            "body",
            rejection.body_text(),
        )])),
    }
}
