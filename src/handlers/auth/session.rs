use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use uuid::Uuid;

use crate::{
    dtos::{
        CsrfTokenResponse, ErrorBody, LoginRequest, LoginResponse, MessageResponse, UserInfo,
        ValidateTokenResponse,
    },
    error::AppError,
    middleware::{issue_csrf_token, AuthIdentity},
    models::SessionData,
    services::{new_session_handle, SESSION_COOKIE},
    utils::validation::ValidatedJson,
    AppState,
};

/// Creates a server-side session for the identity and returns the jar with
/// the session cookie set.
pub(super) async fn establish_session(
    state: &AppState,
    jar: CookieJar,
    identity_id: Uuid,
) -> Result<CookieJar, AppError> {
    let handle = new_session_handle();
    state
        .sessions
        .put(&handle, &SessionData::for_identity(identity_id))
        .await?;

    let mut cookie = Cookie::new(SESSION_COOKIE, handle);
    cookie.set_http_only(true);
    cookie.set_same_site(SameSite::Strict);
    cookie.set_path("/");
    cookie.set_secure(state.config.session.cookie_secure);
    Ok(jar.add(cookie))
}

#[utoipa::path(
    post,
    path = "/api/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = LoginResponse),
        (status = 400, description = "Invalid credentials", body = ErrorBody),
        (status = 423, description = "Account locked", body = ErrorBody)
    ),
    tag = "Authentication"
)]
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    ValidatedJson(request): ValidatedJson<LoginRequest>,
) -> Result<impl IntoResponse, AppError> {
    let identity = state
        .credentials
        .authenticate(&request.email, &request.password)
        .await?;
    let token = state.tokens.issue(identity.identity_id)?;
    let jar = establish_session(&state, jar, identity.identity_id).await?;

    Ok((
        StatusCode::OK,
        jar,
        Json(LoginResponse {
            status: "success".to_string(),
            message: "Login successful".to_string(),
            user_id: identity.identity_id,
            token,
            user: UserInfo {
                email: identity.email.clone(),
                first_name: identity.first_name.clone(),
                last_name: identity.last_name.clone(),
                role: identity.role(),
            },
        }),
    ))
}

#[utoipa::path(
    post,
    path = "/api/auth/logout",
    responses(
        (status = 200, description = "Session destroyed", body = MessageResponse),
        (status = 401, description = "Not authenticated", body = ErrorBody)
    ),
    security(("bearer_auth" = [])),
    tag = "Authentication"
)]
pub async fn logout(
    State(state): State<AppState>,
    jar: CookieJar,
    _caller: AuthIdentity,
) -> Result<impl IntoResponse, AppError> {
    if let Some(cookie) = jar.get(SESSION_COOKIE) {
        state.sessions.destroy(cookie.value()).await?;
    }
    let mut removal = Cookie::from(SESSION_COOKIE);
    removal.set_path("/");
    let jar = jar.remove(removal);

    Ok((
        StatusCode::OK,
        jar,
        Json(MessageResponse {
            status: "success".to_string(),
            message: "Logged out successfully".to_string(),
        }),
    ))
}

#[utoipa::path(
    get,
    path = "/api/auth/validate-token",
    responses(
        (status = 200, description = "Credentials are valid", body = ValidateTokenResponse),
        (status = 401, description = "Not authenticated", body = ErrorBody)
    ),
    security(("bearer_auth" = [])),
    tag = "Authentication"
)]
pub async fn validate_token(
    AuthIdentity(caller): AuthIdentity,
) -> Json<ValidateTokenResponse> {
    Json(ValidateTokenResponse {
        status: "success".to_string(),
        user_id: caller.identity_id,
    })
}

/// Mints a CSRF token and binds it to the caller's session. Requires a live
/// session; a bearer token alone has nothing to bind to.
#[utoipa::path(
    get,
    path = "/api/auth/csrf-token",
    responses(
        (status = 200, description = "Token issued and bound to the session", body = CsrfTokenResponse),
        (status = 400, description = "No session to bind to", body = ErrorBody),
        (status = 401, description = "Not authenticated", body = ErrorBody)
    ),
    security(("bearer_auth" = [])),
    tag = "Authentication"
)]
pub async fn csrf_token(
    State(state): State<AppState>,
    jar: CookieJar,
    _caller: AuthIdentity,
) -> Result<Json<CsrfTokenResponse>, AppError> {
    let handle = jar
        .get(SESSION_COOKIE)
        .map(|cookie| cookie.value().to_string())
        .ok_or_else(|| AppError::Validation("Session required for CSRF token".to_string()))?;
    let mut session = state
        .sessions
        .get(&handle)
        .await?
        .ok_or_else(|| AppError::Validation("Session required for CSRF token".to_string()))?;

    let token = issue_csrf_token();
    session.csrf_token = Some(token.clone());
    state.sessions.put(&handle, &session).await?;

    Ok(Json(CsrfTokenResponse {
        status: "success".to_string(),
        csrf_token: token,
    }))
}
