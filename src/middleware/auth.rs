use axum::{
    async_trait,
    extract::{FromRequestParts, Request, State},
    http::{header, request::Parts},
    middleware::Next,
    response::Response,
};
use axum_extra::extract::cookie::CookieJar;
use uuid::Uuid;

use crate::{error::AppError, services::SESSION_COOKIE, AppState};

/// The resolved caller, attached to the request (and response) extensions by
/// `auth_middleware`. Carries only the identity id; role hydration happens
/// where a role decision is actually made.
#[derive(Debug, Clone, Copy)]
pub struct CurrentIdentity {
    pub identity_id: Uuid,
}

/// Authenticates the request via the session resolver and rejects with 401
/// when neither session nor bearer token identifies a caller.
pub async fn auth_middleware(
    State(state): State<AppState>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let session_handle = jar.get(SESSION_COOKIE).map(|c| c.value().to_string());
    let bearer_token = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::to_string);

    let identity_id = state
        .resolver
        .resolve(session_handle.as_deref(), bearer_token.as_deref())
        .await?;

    let identity = CurrentIdentity { identity_id };
    request.extensions_mut().insert(identity);

    // mirrored onto the response so outer layers (audit) can attribute it
    let mut response = next.run(request).await;
    response.extensions_mut().insert(identity);
    Ok(response)
}

/// Extractor for handlers behind `auth_middleware`.
pub struct AuthIdentity(pub CurrentIdentity);

#[async_trait]
impl<S> FromRequestParts<S> for AuthIdentity
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<CurrentIdentity>()
            .copied()
            .map(AuthIdentity)
            .ok_or(AppError::Unauthenticated)
    }
}
