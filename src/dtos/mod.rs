mod auth;

pub use auth::{
    ChangePasswordRequest, CsrfTokenResponse, LoginRequest, LoginResponse, MessageResponse,
    RegisterRequest, RegisterResponse, UserInfo, ValidateTokenResponse,
};

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// The error envelope every non-2xx response carries.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorBody {
    pub status: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<String>>,
}

impl ErrorBody {
    pub fn new(message: String) -> Self {
        Self {
            status: "error".to_string(),
            message,
            errors: None,
        }
    }

    pub fn with_errors(message: String, errors: Vec<String>) -> Self {
        Self {
            status: "error".to_string(),
            message,
            errors: Some(errors),
        }
    }
}
