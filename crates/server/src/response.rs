//! JSON envelopes shared by every endpoint.

use axum::Json;
use axum::http::{Method, StatusCode};
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use std::collections::BTreeMap;

/// Successful response body.
#[derive(Debug, Serialize)]
pub struct Envelope<T> {
    pub status: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T: Serialize> Envelope<T> {
    pub fn ok(message: impl Into<String>, data: T) -> Self {
        Self {
            status: true,
            message: message.into(),
            data: Some(data),
        }
    }
}

impl<T: Serialize> IntoResponse for Envelope<T> {
    fn into_response(self) -> Response {
        (StatusCode::OK, Json(self)).into_response()
    }
}

/// Failed response body.
#[derive(Debug, Serialize)]
pub struct ErrorEnvelope {
    pub status: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<BTreeMap<String, String>>,
}

/// Request-level failures, each rendered as an [`ErrorEnvelope`].
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("the requested resource could not be found")]
    NotFound,

    #[error("the {0} method is not supported for this resource")]
    MethodNotAllowed(Method),

    /// Field name to problem description.
    #[error("failed validation")]
    FailedValidation(BTreeMap<String, String>),

    #[error("the server encountered an error and could not process your request")]
    Internal(String),
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::MethodNotAllowed(_) => StatusCode::METHOD_NOT_ALLOWED,
            ApiError::FailedValidation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let message = self.to_string();
        let errors = match self {
            ApiError::Internal(cause) => {
                tracing::error!("internal error encountered: {}", cause);
                None
            }
            ApiError::FailedValidation(errors) => Some(errors),
            ApiError::NotFound | ApiError::MethodNotAllowed(_) => None,
        };

        let body = ErrorEnvelope {
            status: false,
            message,
            errors,
        };
        (status, Json(body)).into_response()
    }
}
