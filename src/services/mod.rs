pub mod audit;
pub mod authz;
pub mod credentials;
pub mod lockout;
pub mod policy;
pub mod resolver;
pub mod sessions;
pub mod store;
pub mod token;

pub use audit::{AuditSink, MemoryAuditSink, PgAuditSink};
pub use authz::{
    has_permission, permissions_for, rate_limit_tier, required_permission, AuthorizationEngine,
    Permission, RateLimitTier, Resource,
};
pub use credentials::CredentialService;
pub use lockout::{lock_state, on_failed_attempt, LockState};
pub use policy::{PasswordPolicy, PolicyReport, PolicyViolation};
pub use resolver::SessionResolver;
pub use sessions::{
    new_session_handle, MemorySessionStore, RedisSessionStore, SessionStore, SESSION_COOKIE,
};
pub use store::{
    normalize_email, MemoryOwnership, MemoryRecordStore, OwnershipLookup, PgOwnershipLookup,
    PgRecordStore, RecordStore,
};
pub use token::{AccessClaims, TokenKind, TokenService};
