mod audit;
mod auth;
mod authorize;
mod csrf;

pub use audit::audit_middleware;
pub use auth::{auth_middleware, AuthIdentity, CurrentIdentity};
pub use authorize::{
    ownership_middleware, permission_middleware, OwnershipGate, PermissionGate,
};
pub use csrf::{csrf_middleware, issue_csrf_token, CSRF_HEADER, MIN_CSRF_TOKEN_LEN};
