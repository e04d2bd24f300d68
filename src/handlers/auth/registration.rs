use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use axum_extra::extract::cookie::CookieJar;

use crate::{
    dtos::{ErrorBody, RegisterRequest, RegisterResponse},
    error::AppError,
    handlers::auth::session::establish_session,
    utils::validation::ValidatedJson,
    AppState,
};

#[utoipa::path(
    post,
    path = "/api/auth/register",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Account created", body = RegisterResponse),
        (status = 400, description = "Validation, policy, or duplicate email failure", body = ErrorBody)
    ),
    tag = "Authentication"
)]
pub async fn register(
    State(state): State<AppState>,
    jar: CookieJar,
    ValidatedJson(request): ValidatedJson<RegisterRequest>,
) -> Result<impl IntoResponse, AppError> {
    let identity = state
        .credentials
        .register(
            &request.email,
            &request.password,
            &request.first_name,
            &request.last_name,
        )
        .await?;
    let token = state.tokens.issue(identity.identity_id)?;
    let jar = establish_session(&state, jar, identity.identity_id).await?;

    Ok((
        StatusCode::CREATED,
        jar,
        Json(RegisterResponse {
            status: "success".to_string(),
            message: "User registered successfully".to_string(),
            user_id: identity.identity_id,
            token,
        }),
    ))
}
