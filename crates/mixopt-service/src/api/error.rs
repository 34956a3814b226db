//! Error responses

use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde_json::json;
use tracing::error;

use crate::error::ServiceError;

/// An error rendered as `{"error": "..."}` with a status code
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }
}

impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self {
        if err.is_not_found() {
            Self::new(StatusCode::NOT_FOUND, err.to_string())
        } else if err.is_invalid_input() {
            Self::bad_request(err.to_string())
        } else {
            error!(error = %err, "Request failed");
            Self::new(StatusCode::INTERNAL_SERVER_ERROR, err.to_string())
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "error": self.message }))).into_response()
    }
}
