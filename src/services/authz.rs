use std::sync::Arc;

use axum::http::Method;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    error::AppError,
    models::Role,
    services::store::OwnershipLookup,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Resource {
    Hotel,
    Booking,
    User,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Permission {
    Read,
    Write,
    Delete,
    Admin,
}

/// Grants are data, not code: role (row) by resource (column). `Admin` in a
/// cell implies every other permission on that resource.
#[rustfmt::skip]
const PERMISSION_MATRIX: [[&[Permission]; 4]; 4] = {
    use Permission::*;
    [
        // Hotel                  Booking          User             System
        [&[Read],                 &[Read, Write],  &[Read, Write],  &[]],            // user
        [&[Read, Write, Delete],  &[Read],         &[Read, Write],  &[]],            // hotel_owner
        [&[Read, Write],          &[Read, Write],  &[Read, Write],  &[Read]],        // moderator
        [&[Read, Write, Delete, Admin], &[Read, Write, Delete, Admin],
         &[Read, Write, Delete, Admin], &[Read, Write, Delete, Admin]],              // admin
    ]
};

pub fn permissions_for(role: Role, resource: Resource) -> &'static [Permission] {
    PERMISSION_MATRIX[role as usize][resource as usize]
}

pub fn has_permission(role: Role, resource: Resource, permission: Permission) -> bool {
    let granted = permissions_for(role, resource);
    granted.contains(&permission) || granted.contains(&Permission::Admin)
}

/// Maps an HTTP method to the permission it demands. Unrecognized methods
/// deliberately fall back to `Read`; see DESIGN.md.
pub fn required_permission(method: &Method) -> Permission {
    match *method {
        Method::POST | Method::PUT | Method::PATCH => Permission::Write,
        Method::DELETE => Permission::Delete,
        _ => Permission::Read,
    }
}

/// Per-role rate limit policy. Selection only; enforcement lives at the edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitTier {
    pub window_secs: u64,
    pub max_requests: u32,
}

pub fn rate_limit_tier(role: Role) -> RateLimitTier {
    let max_requests = match role {
        Role::Admin => 1000,
        Role::Moderator => 500,
        Role::HotelOwner => 200,
        Role::User => 100,
    };
    RateLimitTier {
        window_secs: 15 * 60,
        max_requests,
    }
}

/// Role- and instance-level authorization decisions.
#[derive(Clone)]
pub struct AuthorizationEngine {
    ownership: Arc<dyn OwnershipLookup>,
}

impl AuthorizationEngine {
    pub fn new(ownership: Arc<dyn OwnershipLookup>) -> Self {
        Self { ownership }
    }

    pub fn authorize(
        &self,
        role: Role,
        resource: Resource,
        permission: Permission,
    ) -> Result<(), AppError> {
        if has_permission(role, resource, permission) {
            Ok(())
        } else {
            Err(AppError::Forbidden(
                "Insufficient permissions".to_string(),
            ))
        }
    }

    /// Instance-level check. Admins and moderators bypass ownership; everyone
    /// else must own the specific resource instance.
    pub async fn authorize_ownership(
        &self,
        caller: Uuid,
        role: Role,
        resource: Resource,
        resource_id: Option<Uuid>,
    ) -> Result<(), AppError> {
        if matches!(role, Role::Admin | Role::Moderator) {
            return Ok(());
        }

        let resource_id = resource_id.ok_or(AppError::MissingResourceId)?;

        let owns = match resource {
            Resource::Hotel => self
                .ownership
                .owner_of_hotel(resource_id)
                .await?
                .map(|owner| owner == caller)
                .unwrap_or(false),
            Resource::Booking => {
                self.ownership
                    .booking_belongs_to_user(resource_id, caller)
                    .await?
            }
            Resource::User => resource_id == caller,
            // system resources have no per-instance owner
            Resource::System => false,
        };

        if owns {
            Ok(())
        } else {
            Err(AppError::Forbidden(
                "You can only access your own resources".to_string(),
            ))
        }
    }
}
