use axum::{
    extract::{Path, Request, State},
    middleware::Next,
    response::Response,
};
use uuid::Uuid;

use crate::{
    error::AppError,
    middleware::auth::CurrentIdentity,
    models::Role,
    services::{required_permission, Resource},
    AppState,
};

/// State for a permission-checked route group: which resource class its
/// routes operate on.
#[derive(Clone)]
pub struct PermissionGate {
    pub state: AppState,
    pub resource: Resource,
}

/// State for an ownership-checked route group.
#[derive(Clone)]
pub struct OwnershipGate {
    pub state: AppState,
    pub resource: Resource,
}

async fn caller_role(state: &AppState, identity_id: Uuid) -> Result<Role, AppError> {
    let identity = state
        .store
        .find_by_id(identity_id)
        .await?
        .ok_or(AppError::Unauthenticated)?;
    Ok(identity.role())
}

/// Role-level check: the HTTP method decides the permission demanded on the
/// gate's resource class.
pub async fn permission_middleware(
    State(gate): State<PermissionGate>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let caller = request
        .extensions()
        .get::<CurrentIdentity>()
        .copied()
        .ok_or(AppError::Unauthenticated)?;

    let role = caller_role(&gate.state, caller.identity_id).await?;
    let permission = required_permission(request.method());
    gate.state.authz.authorize(role, gate.resource, permission)?;

    Ok(next.run(request).await)
}

/// Instance-level check: the caller must own the resource named by the path
/// id, unless their role bypasses ownership.
pub async fn ownership_middleware(
    State(gate): State<OwnershipGate>,
    resource_id: Option<Path<Uuid>>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let caller = request
        .extensions()
        .get::<CurrentIdentity>()
        .copied()
        .ok_or(AppError::Unauthenticated)?;

    let role = caller_role(&gate.state, caller.identity_id).await?;
    gate.state
        .authz
        .authorize_ownership(
            caller.identity_id,
            role,
            gate.resource,
            resource_id.map(|Path(id)| id),
        )
        .await?;

    Ok(next.run(request).await)
}
