use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

use crate::notify::NotifyError;
use crate::submission::ValidationError;

pub const UNEXPECTED_MESSAGE: &str = "An unexpected error occurred";

#[derive(Debug)]
pub enum AppError {
    NotFound(String),
    BadRequest(String),
    Notify(NotifyError),
    Internal(String),
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AppError::NotFound(msg) => write!(f, "Not Found: {msg}"),
            AppError::BadRequest(msg) => write!(f, "Bad Request: {msg}"),
            AppError::Notify(err) => write!(f, "Notification failed: {err}"),
            AppError::Internal(msg) => write!(f, "Internal Error: {msg}"),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::Notify(err) => {
                tracing::error!("{err}");
                let message = match err {
                    NotifyError::Config(_) => "Email server configuration is incomplete",
                    NotifyError::Auth(_) => {
                        "Email authentication failed. Please check your credentials."
                    }
                    NotifyError::Protocol(_) => "Failed to send email. Please try again.",
                };
                (StatusCode::INTERNAL_SERVER_ERROR, message.to_string())
            }
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {msg}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    UNEXPECTED_MESSAGE.to_string(),
                )
            }
        };

        failure(status, &message)
    }
}

impl From<NotifyError> for AppError {
    fn from(err: NotifyError) -> Self {
        AppError::Notify(err)
    }
}

impl From<ValidationError> for AppError {
    fn from(err: ValidationError) -> Self {
        AppError::BadRequest(err.to_string())
    }
}

/// `{success: false, message}` body used by every failing JSON endpoint.
pub fn failure(status: StatusCode, message: &str) -> Response {
    let body = json!({ "success": false, "message": message });
    (status, axum::Json(body)).into_response()
}
