//! Request extractors that reject with [`AppError`] instead of axum's plain-text rejections.

use axum::{
    body::Bytes,
    extract::{FromRequest, Request},
    http::{header::CONTENT_TYPE, HeaderMap},
};
use serde::de::DeserializeOwned;

use crate::error::AppError;

/// JSON body that requires `Content-Type: application/json`.
///
/// A missing or different content type answers 415; a body that does not
/// decode into `T` answers 400.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonBody<T>(pub T);

impl<T, S> FromRequest<S> for JsonBody<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let content_type = content_type(req.headers());
        if !is_json(&content_type) {
            return Err(AppError::unsupported_media_type(content_type));
        }

        let bytes = Bytes::from_request(req, state).await.map_err(|rejection| {
            tracing::debug!(error = %rejection.body_text(), "failed to buffer request body");
            AppError::invalid_data()
        })?;

        serde_json::from_slice(&bytes)
            .map(JsonBody)
            .map_err(|err| {
                tracing::debug!(error = %err, "request body rejected");
                AppError::invalid_data()
            })
    }
}

fn content_type(headers: &HeaderMap) -> String {
    headers
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default()
        .to_string()
}

/// Media type must be `application/json`; parameters such as `charset` are ignored.
fn is_json(content_type: &str) -> bool {
    content_type
        .split(';')
        .next()
        .map(|essence| essence.trim().eq_ignore_ascii_case("application/json"))
        .unwrap_or(false)
}
