//! Error handling for the HTTP layer

use axum::{
    extract::rejection::{PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use booklib_db::DbError;
use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

pub const STORAGE_FAILURE_MSG: &str = "request failed. Verify data meets any requirements \
     (i.e. uniqueness, null, etc...) and try again";
pub const INVALID_DATA_MSG: &str = "invalid data passing.";
pub const UNSUPPORTED_CONTENT_TYPE_MSG: &str = "unsupported Content-Type.";
pub const EMPTY_FIELD_MSG: &str =
    "field is empty or not define.  Please fill out all required fields";
pub const BAD_REQUEST_MSG: &str = "bad Request. Please check your relative path";
pub const INTERNAL_ERROR_MSG: &str = "An internal server error occurred";

/// Body of every error response: `{"error": "<message>"}`
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
}

/// Application error types that map to HTTP responses
#[derive(Error, Debug)]
pub enum AppError {
    #[error("bad request: {message}")]
    BadRequest { message: String },

    #[error("unsupported media type: {content_type}")]
    UnsupportedMediaType { content_type: String },

    #[error("validation error: {field} is empty")]
    EmptyField { field: &'static str },

    #[error("not found: {path}")]
    NotFound { path: String },

    #[error(transparent)]
    Storage(#[from] DbError),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    /// Unparsable query string or path parameter
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest {
            message: message.into(),
        }
    }

    /// Unparsable request body
    pub fn invalid_data() -> Self {
        Self::bad_request(INVALID_DATA_MSG)
    }

    pub fn unsupported_media_type(content_type: impl Into<String>) -> Self {
        Self::UnsupportedMediaType {
            content_type: content_type.into(),
        }
    }

    /// A required field was empty or zero
    pub fn empty_field(field: &'static str) -> Self {
        Self::EmptyField { field }
    }

    pub fn not_found(path: impl Into<String>) -> Self {
        Self::NotFound { path: path.into() }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::BadRequest { .. } | AppError::EmptyField { .. } => StatusCode::BAD_REQUEST,
            AppError::UnsupportedMediaType { .. } => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            AppError::NotFound { .. } => StatusCode::NOT_FOUND,
            AppError::Storage(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message returned to the client. Storage and internal failures never
    /// leak their details.
    pub fn client_message(&self) -> String {
        match self {
            AppError::BadRequest { message } => message.clone(),
            AppError::UnsupportedMediaType { .. } => UNSUPPORTED_CONTENT_TYPE_MSG.to_string(),
            AppError::EmptyField { field } => format!("{} {}", field, EMPTY_FIELD_MSG),
            AppError::NotFound { .. } => BAD_REQUEST_MSG.to_string(),
            AppError::Storage(_) => STORAGE_FAILURE_MSG.to_string(),
            AppError::Internal(_) => INTERNAL_ERROR_MSG.to_string(),
        }
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        tracing::debug!(error = %rejection.body_text(), "query string rejected");
        Self::bad_request(BAD_REQUEST_MSG)
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        tracing::debug!(error = %rejection.body_text(), "path parameter rejected");
        Self::bad_request(BAD_REQUEST_MSG)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let error_id = Uuid::new_v4();
        let status = self.status();

        if status.is_server_error() {
            tracing::error!(
                error_id = %error_id,
                status_code = %status.as_u16(),
                error = %self,
                "request failed"
            );
        } else {
            tracing::warn!(
                error_id = %error_id,
                status_code = %status.as_u16(),
                error = %self,
                "request rejected"
            );
        }

        let body = ErrorBody {
            error: self.client_message(),
        };

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    async fn body_of(error: AppError) -> (StatusCode, serde_json::Value) {
        let response = error.into_response();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_empty_field_is_a_client_error() {
        let (status, body) = body_of(AppError::empty_field("isbn")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(
            body["error"],
            "isbn field is empty or not define.  Please fill out all required fields"
        );
    }

    #[tokio::test]
    async fn test_unsupported_media_type_mapping() {
        let (status, body) = body_of(AppError::unsupported_media_type("text/plain")).await;
        assert_eq!(status, StatusCode::UNSUPPORTED_MEDIA_TYPE);
        assert_eq!(body["error"], UNSUPPORTED_CONTENT_TYPE_MSG);
    }

    #[tokio::test]
    async fn test_storage_error_hides_details() {
        let error = AppError::Storage(DbError::Sqlx(booklib_db::SqlxError::RowNotFound));
        let (status, body) = body_of(error).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], STORAGE_FAILURE_MSG);
    }

    #[tokio::test]
    async fn test_internal_error_mapping() {
        let error = AppError::Internal(anyhow::anyhow!("connection pool exhausted"));
        let (status, body) = body_of(error).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], INTERNAL_ERROR_MSG);
    }

    #[tokio::test]
    async fn test_error_body_has_only_error_key() {
        let (_, body) = body_of(AppError::invalid_data()).await;
        assert_eq!(body, serde_json::json!({ "error": INVALID_DATA_MSG }));
    }
}
