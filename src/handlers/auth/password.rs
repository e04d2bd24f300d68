use axum::{extract::State, Json};

use crate::{
    dtos::{ChangePasswordRequest, ErrorBody, MessageResponse},
    error::AppError,
    middleware::AuthIdentity,
    utils::validation::ValidatedJson,
    AppState,
};

#[utoipa::path(
    post,
    path = "/api/auth/change-password",
    request_body = ChangePasswordRequest,
    responses(
        (status = 200, description = "Password rotated", body = MessageResponse),
        (status = 400, description = "Wrong current password, policy failure, or reuse", body = ErrorBody),
        (status = 401, description = "Not authenticated", body = ErrorBody),
        (status = 403, description = "CSRF token missing or invalid", body = ErrorBody),
        (status = 404, description = "Identity no longer exists", body = ErrorBody)
    ),
    security(("bearer_auth" = [])),
    tag = "Authentication"
)]
pub async fn change_password(
    State(state): State<AppState>,
    AuthIdentity(caller): AuthIdentity,
    ValidatedJson(request): ValidatedJson<ChangePasswordRequest>,
) -> Result<Json<MessageResponse>, AppError> {
    state
        .credentials
        .change_password(
            caller.identity_id,
            &request.current_password,
            &request.new_password,
        )
        .await?;

    Ok(Json(MessageResponse {
        status: "success".to_string(),
        message: "Password changed successfully".to_string(),
    }))
}
