mod audit;
mod identity;
mod session;

pub use audit::AuditEvent;
pub use identity::{Identity, Role};
pub use session::SessionData;
