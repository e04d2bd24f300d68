pub mod password;
pub mod registration;
pub mod session;

pub use password::change_password;
pub use registration::register;
pub use session::{csrf_token, login, logout, validate_token};
