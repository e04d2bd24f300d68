use std::{sync::Arc, time::Instant};

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use tracing::warn;

use crate::{middleware::auth::CurrentIdentity, models::AuditEvent, AppState};

/// Times every request and hands the result to the audit sink on a spawned
/// task, so a slow sink never holds up the response.
pub async fn audit_middleware(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let started = Instant::now();
    let method = request.method().to_string();
    let path = request.uri().path().to_string();

    let response = next.run(request).await;

    let identity_id = response
        .extensions()
        .get::<CurrentIdentity>()
        .map(|caller| caller.identity_id);
    let event = AuditEvent::new(
        identity_id,
        method,
        path,
        response.status().as_u16(),
        started.elapsed().as_millis() as u64,
    );

    let sink = Arc::clone(&state.audit);
    tokio::spawn(async move {
        if let Err(e) = sink.record(event).await {
            warn!(error = %e, "failed to record audit event");
        }
    });

    response
}
