use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;
use tracing::error;

use crate::dtos::ErrorBody;

/// Error taxonomy for the whole service. Every variant maps to exactly one
/// HTTP status and a stable wire body.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Account is locked due to too many failed login attempts")]
    AccountLocked,

    #[error("Authentication required")]
    Unauthenticated,

    #[error("{0}")]
    Forbidden(String),

    #[error("Invalid CSRF token")]
    CsrfRejected,

    #[error("Resource ID required")]
    MissingResourceId,

    #[error("Current password is incorrect")]
    WrongCurrentPassword,

    #[error("Password does not meet the password policy")]
    PolicyViolation(Vec<String>),

    #[error("New password cannot be the same as any of your previous 5 passwords")]
    PasswordReused,

    #[error("User with this email already exists")]
    DuplicateEmail,

    #[error("{0}")]
    NotFound(String),

    #[error("Store unavailable: {0}")]
    StoreUnavailable(anyhow::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal server error: {0}")]
    Internal(anyhow::Error),
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        AppError::StoreUnavailable(err.into())
    }
}

impl From<redis::RedisError> for AppError {
    fn from(err: redis::RedisError) -> Self {
        AppError::StoreUnavailable(err.into())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            AppError::Validation(message) => {
                (StatusCode::BAD_REQUEST, ErrorBody::new(message))
            }
            AppError::InvalidCredentials
            | AppError::WrongCurrentPassword
            | AppError::PasswordReused
            | AppError::DuplicateEmail => {
                (StatusCode::BAD_REQUEST, ErrorBody::new(self.to_string()))
            }
            AppError::MissingResourceId => {
                (StatusCode::BAD_REQUEST, ErrorBody::new(self.to_string()))
            }
            AppError::PolicyViolation(violations) => (
                StatusCode::BAD_REQUEST,
                ErrorBody::with_errors(violations.join(", "), violations),
            ),
            AppError::AccountLocked => {
                (StatusCode::LOCKED, ErrorBody::new(self.to_string()))
            }
            AppError::Unauthenticated => {
                (StatusCode::UNAUTHORIZED, ErrorBody::new(self.to_string()))
            }
            AppError::Forbidden(message) => (StatusCode::FORBIDDEN, ErrorBody::new(message)),
            AppError::CsrfRejected => (StatusCode::FORBIDDEN, ErrorBody::new(self.to_string())),
            AppError::NotFound(message) => (StatusCode::NOT_FOUND, ErrorBody::new(message)),
            AppError::StoreUnavailable(err) => {
                error!(error = %err, "backing store unavailable");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorBody::new("Internal server error".to_string()),
                )
            }
            AppError::Config(message) => {
                error!(error = %message, "configuration error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorBody::new("Internal server error".to_string()),
                )
            }
            AppError::Internal(err) => {
                error!(error = %err, "internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorBody::new("Internal server error".to_string()),
                )
            }
        };

        (status, Json(body)).into_response()
    }
}
