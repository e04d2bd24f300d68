use async_trait::async_trait;
use sqlx::PgPool;
use std::sync::Mutex;

use crate::{error::AppError, models::AuditEvent};

/// Destination for audit events. Recording happens off the request path; a
/// failing sink never fails a request.
#[async_trait]
pub trait AuditSink: Send + Sync {
    async fn record(&self, event: AuditEvent) -> Result<(), AppError>;
}

pub struct PgAuditSink {
    pool: PgPool,
}

impl PgAuditSink {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AuditSink for PgAuditSink {
    async fn record(&self, event: AuditEvent) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO audit_events (
                event_id, identity_id, method, path, status, latency_ms, created_utc
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(event.event_id)
        .bind(event.identity_id)
        .bind(&event.method)
        .bind(&event.path)
        .bind(event.status as i32)
        .bind(event.latency_ms as i64)
        .bind(event.created_utc)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}

/// Captures events in memory for assertions in tests.
#[derive(Default)]
pub struct MemoryAuditSink {
    pub events: Mutex<Vec<AuditEvent>>,
}

impl MemoryAuditSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn recorded(&self) -> Vec<AuditEvent> {
        self.events.lock().map(|events| events.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl AuditSink for MemoryAuditSink {
    async fn record(&self, event: AuditEvent) -> Result<(), AppError> {
        if let Ok(mut events) = self.events.lock() {
            events.push(event);
        }
        Ok(())
    }
}
