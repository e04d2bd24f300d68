use axum::{extract::State, Json};

use crate::{
    dtos::{ErrorBody, MessageResponse},
    error::AppError,
    AppState,
};

/// Liveness plus a round trip to both backing stores.
#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Service and stores are reachable", body = MessageResponse),
        (status = 500, description = "A backing store is unreachable", body = ErrorBody)
    ),
    tag = "Health"
)]
pub async fn health_check(State(state): State<AppState>) -> Result<Json<MessageResponse>, AppError> {
    state.store.health_check().await?;
    state.sessions.health_check().await?;
    Ok(Json(MessageResponse {
        status: "success".to_string(),
        message: "healthy".to_string(),
    }))
}
