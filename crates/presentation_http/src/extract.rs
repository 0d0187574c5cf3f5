//! Request extractors
//!
//! Provides an `AppJson` extractor whose rejections use the API error body.

use axum::{
    Json,
    extract::{FromRequest, Request, rejection::JsonRejection},
};
use serde::de::DeserializeOwned;

use crate::error::ApiError;

/// A JSON extractor that answers malformed bodies with a 400 `ApiError`
///
/// Use this instead of `Json<T>` so that every rejection has the same
/// `{error, code}` shape as handler errors.
#[derive(Debug, Clone, Copy, Default)]
pub struct AppJson<T>(pub T);

impl<T, S> FromRequest<S> for AppJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection| ApiError::BadRequest(rejection_message(&rejection)))?;

        Ok(Self(value))
    }
}

fn rejection_message(rejection: &JsonRejection) -> String {
    match rejection {
        JsonRejection::MissingJsonContentType(_) => {
            "Expected a request with Content-Type: application/json".to_string()
        },
        JsonRejection::JsonDataError(e) => e.body_text(),
        _ => "Request body must be valid JSON".to_string(),
    }
}
