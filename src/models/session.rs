use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Server-side session state, keyed by an opaque cookie handle.
///
/// A session may exist before login (anonymous) and is hydrated with an
/// identity the first time a valid bearer token arrives on it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionData {
    pub identity_id: Option<Uuid>,
    pub csrf_token: Option<String>,
    pub created_utc: DateTime<Utc>,
}

impl SessionData {
    pub fn new() -> Self {
        Self {
            identity_id: None,
            csrf_token: None,
            created_utc: Utc::now(),
        }
    }

    pub fn for_identity(identity_id: Uuid) -> Self {
        Self {
            identity_id: Some(identity_id),
            ..Self::new()
        }
    }
}

impl Default for SessionData {
    fn default() -> Self {
        Self::new()
    }
}
