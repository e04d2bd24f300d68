use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use anyhow::anyhow;

use crate::error::AppError;

/// A plaintext password. Kept out of Debug output.
#[derive(Clone)]
pub struct Password(String);

impl Password {
    pub fn new(raw: String) -> Self {
        Self(raw)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for Password {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Password(***)")
    }
}

/// A PHC-formatted password hash string.
#[derive(Debug, Clone)]
pub struct PasswordHashString(String);

impl PasswordHashString {
    pub fn new(phc: String) -> Self {
        Self(phc)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

pub fn hash_password(password: &Password) -> Result<PasswordHashString, anyhow::Error> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_str().as_bytes(), &salt)
        .map_err(|e| anyhow!("failed to hash password: {e}"))?;
    Ok(PasswordHashString(hash.to_string()))
}

/// Returns `Ok(true)` on a match and `Ok(false)` on a mismatch. A stored hash
/// that does not parse reads as a mismatch.
pub fn verify_password(password: &Password, hash: &PasswordHashString) -> bool {
    let Ok(parsed) = PasswordHash::new(hash.as_str()) else {
        return false;
    };
    Argon2::default()
        .verify_password(password.as_str().as_bytes(), &parsed)
        .is_ok()
}

/// Hashing runs on the blocking pool; argon2 pins a core for tens of
/// milliseconds and must not stall the async runtime.
pub async fn hash_password_async(password: Password) -> Result<PasswordHashString, AppError> {
    tokio::task::spawn_blocking(move || hash_password(&password))
        .await
        .map_err(|e| AppError::Internal(anyhow!("hashing task failed: {e}")))?
        .map_err(AppError::Internal)
}

pub async fn verify_password_async(
    password: Password,
    hash: PasswordHashString,
) -> Result<bool, AppError> {
    tokio::task::spawn_blocking(move || verify_password(&password, &hash))
        .await
        .map_err(|e| AppError::Internal(anyhow!("verification task failed: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_then_verify() {
        let password = Password::new("Str0ng@pass".to_string());
        let hash = hash_password(&password).unwrap();
        assert!(verify_password(&password, &hash));
    }

    #[test]
    fn wrong_password_fails_verification() {
        let hash = hash_password(&Password::new("Str0ng@pass".to_string())).unwrap();
        assert!(!verify_password(&Password::new("Wr0ng@pass".to_string()), &hash));
    }

    #[test]
    fn same_password_hashes_differently() {
        let password = Password::new("Str0ng@pass".to_string());
        let first = hash_password(&password).unwrap();
        let second = hash_password(&password).unwrap();
        assert_ne!(first.as_str(), second.as_str());
    }

    #[test]
    fn unparseable_hash_is_a_mismatch() {
        let password = Password::new("Str0ng@pass".to_string());
        let hash = PasswordHashString::new("not-a-phc-string".to_string());
        assert!(!verify_password(&password, &hash));
    }

    #[test]
    fn debug_does_not_leak_plaintext() {
        let password = Password::new("Str0ng@pass".to_string());
        assert_eq!(format!("{password:?}"), "Password(***)");
    }
}
