use std::sync::Arc;

use uuid::Uuid;

use crate::{
    error::AppError,
    services::{sessions::SessionStore, token::TokenService},
};

/// Resolves the caller's identity from request credentials.
///
/// Strategies run in a fixed order: a live session that already carries an
/// identity wins; otherwise a valid bearer token resolves the caller and, if
/// an anonymous session rode along, hydrates it so the next request needs no
/// token.
#[derive(Clone)]
pub struct SessionResolver {
    tokens: TokenService,
    sessions: Arc<dyn SessionStore>,
}

impl SessionResolver {
    pub fn new(tokens: TokenService, sessions: Arc<dyn SessionStore>) -> Self {
        Self { tokens, sessions }
    }

    pub async fn resolve(
        &self,
        session_handle: Option<&str>,
        bearer_token: Option<&str>,
    ) -> Result<Uuid, AppError> {
        let session = match session_handle {
            Some(handle) => self.sessions.get(handle).await?.map(|data| (handle, data)),
            None => None,
        };

        if let Some((_, data)) = &session {
            if let Some(identity_id) = data.identity_id {
                return Ok(identity_id);
            }
        }

        if let Some(token) = bearer_token {
            if let Ok(identity_id) = self.tokens.verified_identity(token) {
                if let Some((handle, mut data)) = session {
                    data.identity_id = Some(identity_id);
                    self.sessions.put(handle, &data).await?;
                }
                return Ok(identity_id);
            }
        }

        Err(AppError::Unauthenticated)
    }
}
