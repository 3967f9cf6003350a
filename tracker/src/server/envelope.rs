//! Error and panic conversion into the response envelope

use std::any::Any;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use openapi_server::ApiEnvelope;
use tracing::{error, warn};

use crate::errors::TrackerError;

impl TrackerError {
    /// HTTP status category for the facade
    pub fn status_code(&self) -> StatusCode {
        match self {
            TrackerError::NotFound(_) => StatusCode::NOT_FOUND,
            TrackerError::Validation(_) => StatusCode::BAD_REQUEST,
            TrackerError::MethodNotAllowed(_) => StatusCode::METHOD_NOT_ALLOWED,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for TrackerError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let message = match &self {
            TrackerError::NotFound(msg)
            | TrackerError::Validation(msg)
            | TrackerError::MethodNotAllowed(msg) => msg.clone(),
            other => other.to_string(),
        };

        if self.is_client_error() {
            warn!("Request rejected ({}): {}", status, message);
        } else {
            error!("Request failed ({}): {}", status, message);
        }

        (status, Json(ApiEnvelope::<()>::failure(message))).into_response()
    }
}

/// Response for a handler that panicked
pub fn panic_response(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "unknown panic payload".to_string()
    };
    error!("Handler panicked: {}", detail);

    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ApiEnvelope::<()>::failure("internal server error")),
    )
        .into_response()
}
