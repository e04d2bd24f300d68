use axum::{
    extract::{Request, State},
    http::Method,
    middleware::Next,
    response::Response,
};
use axum_extra::extract::cookie::CookieJar;
use rand::Rng;
use subtle::ConstantTimeEq;

use crate::{error::AppError, services::SESSION_COOKIE, AppState};

pub const CSRF_HEADER: &str = "x-csrf-token";
pub const MIN_CSRF_TOKEN_LEN: usize = 32;

pub fn issue_csrf_token() -> String {
    let bytes: [u8; 32] = rand::rngs::OsRng.gen();
    hex::encode(bytes)
}

fn is_state_changing(method: &Method) -> bool {
    matches!(
        *method,
        Method::POST | Method::PUT | Method::PATCH | Method::DELETE
    )
}

fn tokens_match(supplied: &str, bound: &str) -> bool {
    supplied.len() == bound.len()
        && supplied.as_bytes().ct_eq(bound.as_bytes()).into()
}

/// Double-submit check for state-changing requests.
///
/// Requests with no live session are exempt; the token only protects actions
/// bound to a session (login and register create one, they are not guarded by
/// one). Comparison is constant-time.
pub async fn csrf_middleware(
    State(state): State<AppState>,
    jar: CookieJar,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    if !is_state_changing(request.method()) {
        return Ok(next.run(request).await);
    }

    let Some(cookie) = jar.get(SESSION_COOKIE) else {
        return Ok(next.run(request).await);
    };
    let Some(session) = state.sessions.get(cookie.value()).await? else {
        return Ok(next.run(request).await);
    };

    let Some(bound) = session.csrf_token else {
        return Err(AppError::CsrfRejected);
    };
    let supplied = request
        .headers()
        .get(CSRF_HEADER)
        .and_then(|value| value.to_str().ok())
        .ok_or(AppError::CsrfRejected)?;

    if supplied.len() < MIN_CSRF_TOKEN_LEN || !tokens_match(supplied, &bound) {
        return Err(AppError::CsrfRejected);
    }

    Ok(next.run(request).await)
}
