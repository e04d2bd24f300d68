use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

/// Caller roles, ordered from least to most privileged.
///
/// The discriminants index into the permission matrix, so the order here is
/// load-bearing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    User,
    HotelOwner,
    Moderator,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::HotelOwner => "hotel_owner",
            Role::Moderator => "moderator",
            Role::Admin => "admin",
        }
    }

    /// Unknown role codes resolve to the least-privileged role rather than
    /// failing the request.
    pub fn parse_or_default(code: &str) -> Role {
        match code {
            "admin" => Role::Admin,
            "moderator" => Role::Moderator,
            "hotel_owner" => Role::HotelOwner,
            _ => Role::User,
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A stored account record. Field names match the `identities` table columns.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Identity {
    pub identity_id: Uuid,
    pub email: String,
    pub password_hash: String,
    pub first_name: String,
    pub last_name: String,
    pub role_code: String,
    pub active_flag: bool,
    pub email_verified: bool,
    pub failed_login_attempts: i32,
    pub locked_until: Option<DateTime<Utc>>,
    pub last_login_utc: Option<DateTime<Utc>>,
    pub password_created_utc: DateTime<Utc>,
    pub created_utc: DateTime<Utc>,
}

impl Identity {
    pub fn new(email: String, password_hash: String, first_name: String, last_name: String) -> Self {
        let now = Utc::now();
        Self {
            identity_id: Uuid::new_v4(),
            email,
            password_hash,
            first_name,
            last_name,
            role_code: Role::User.as_str().to_string(),
            active_flag: true,
            email_verified: false,
            failed_login_attempts: 0,
            locked_until: None,
            last_login_utc: None,
            password_created_utc: now,
            created_utc: now,
        }
    }

    pub fn role(&self) -> Role {
        Role::parse_or_default(&self.role_code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_role_codes_parse() {
        assert_eq!(Role::parse_or_default("admin"), Role::Admin);
        assert_eq!(Role::parse_or_default("moderator"), Role::Moderator);
        assert_eq!(Role::parse_or_default("hotel_owner"), Role::HotelOwner);
        assert_eq!(Role::parse_or_default("user"), Role::User);
    }

    #[test]
    fn unknown_role_code_falls_back_to_user() {
        assert_eq!(Role::parse_or_default("superuser"), Role::User);
        assert_eq!(Role::parse_or_default(""), Role::User);
    }

    #[test]
    fn new_identity_starts_unlocked() {
        let identity = Identity::new(
            "alice@example.com".into(),
            "hash".into(),
            "Alice".into(),
            "Smith".into(),
        );
        assert_eq!(identity.failed_login_attempts, 0);
        assert!(identity.locked_until.is_none());
        assert_eq!(identity.role(), Role::User);
    }
}
