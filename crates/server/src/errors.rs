use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;
use tracing::error;

use models::errors::ModelError;
use service::auth::errors::AuthError;
use service::errors::ServiceError;
use service::upload::UploadError;

/// Handler error rendered as `{success:false, message, error?, data?}`.
#[derive(Debug)]
pub struct JsonApiError {
    pub status: StatusCode,
    pub message: String,
    pub error: Option<String>,
    pub data: Option<serde_json::Value>,
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    success: bool,
    message: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<&'a serde_json::Value>,
}

impl JsonApiError {
    pub fn new(status: StatusCode, message: impl Into<String>, error: Option<String>) -> Self {
        Self { status, message: message.into(), error, data: None }
    }

    pub fn bad_request(error: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, "Validation Error", Some(error.into()))
    }

    pub fn not_found(error: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, "Not Found", Some(error.into()))
    }

    /// Logs the cause; the response carries no detail.
    pub fn internal(cause: impl std::fmt::Display) -> Self {
        error!(error = %cause, "request failed");
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error", None)
    }

    pub fn with_data(mut self, data: serde_json::Value) -> Self {
        self.data = Some(data);
        self
    }
}

impl IntoResponse for JsonApiError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            success: false,
            message: &self.message,
            error: self.error.as_deref(),
            data: self.data.as_ref(),
        };
        (self.status, Json(body)).into_response()
    }
}

impl From<ServiceError> for JsonApiError {
    fn from(e: ServiceError) -> Self {
        match e {
            ServiceError::Validation(msg) | ServiceError::Model(ModelError::Validation(msg)) => Self::bad_request(msg),
            ServiceError::NotFound(msg) => Self::not_found(msg),
            ServiceError::UpstreamStorage(msg) => Self::new(StatusCode::BAD_GATEWAY, "Storage Error", Some(msg)),
            other => Self::internal(other),
        }
    }
}

impl From<UploadError> for JsonApiError {
    fn from(e: UploadError) -> Self {
        match e {
            UploadError::Service(inner) => inner.into(),
            UploadError::Rejected { category, failures } => {
                let message = format!("Upload of {category} documents failed; employee was not created");
                Self::new(StatusCode::UNPROCESSABLE_ENTITY, message, Some("upload rejected".into()))
                    .with_data(serde_json::json!({ "failedUploads": failures }))
            }
        }
    }
}

impl From<AuthError> for JsonApiError {
    fn from(e: AuthError) -> Self {
        match e {
            AuthError::Validation(msg) => Self::bad_request(msg),
            AuthError::Unauthorized => Self::new(StatusCode::UNAUTHORIZED, "Invalid credentials", None),
            other => {
                error!(code = other.code(), "auth failure");
                Self::internal(other)
            }
        }
    }
}

/// Body used by the session middleware: `{"error": "..."}`.
pub fn session_error(status: StatusCode, message: &str) -> Response {
    (status, Json(serde_json::json!({ "error": message }))).into_response()
}

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("storage setup failed: {0}")]
    Storage(String),
    #[error(transparent)]
    Any(#[from] anyhow::Error),
}
