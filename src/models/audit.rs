use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One audited request: who did what, the outcome, and how long it took.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEvent {
    pub event_id: Uuid,
    pub identity_id: Option<Uuid>,
    pub method: String,
    pub path: String,
    pub status: u16,
    pub latency_ms: u64,
    pub created_utc: DateTime<Utc>,
}

impl AuditEvent {
    pub fn new(
        identity_id: Option<Uuid>,
        method: String,
        path: String,
        status: u16,
        latency_ms: u64,
    ) -> Self {
        Self {
            event_id: Uuid::new_v4(),
            identity_id,
            method,
            path,
            status,
            latency_ms,
            created_utc: Utc::now(),
        }
    }
}
