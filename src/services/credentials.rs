use std::sync::Arc;

use chrono::Utc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::{
    error::AppError,
    models::Identity,
    services::{
        lockout::{self, LockState},
        policy::PasswordPolicy,
        store::{normalize_email, RecordStore},
    },
    utils::password::{
        hash_password, hash_password_async, verify_password_async, Password, PasswordHashString,
    },
};

/// Registration, authentication, and password rotation against the record
/// store.
#[derive(Clone)]
pub struct CredentialService {
    store: Arc<dyn RecordStore>,
    // verified against for unknown emails so their response time matches a
    // real mismatch
    dummy_hash: PasswordHashString,
}

impl CredentialService {
    pub fn new(store: Arc<dyn RecordStore>) -> Result<Self, AppError> {
        let filler = Password::new(crate::services::sessions::new_session_handle());
        let dummy_hash = hash_password(&filler).map_err(AppError::Internal)?;
        Ok(Self { store, dummy_hash })
    }

    pub async fn register(
        &self,
        email: &str,
        raw_password: &str,
        first_name: &str,
        last_name: &str,
    ) -> Result<Identity, AppError> {
        let email = normalize_email(email);

        let report = PasswordPolicy::validate(raw_password, Some(&email));
        if !report.is_valid() {
            return Err(AppError::PolicyViolation(report.messages()));
        }

        if self.store.find_by_email(&email).await?.is_some() {
            return Err(AppError::DuplicateEmail);
        }

        let hash = hash_password_async(Password::new(raw_password.to_string())).await?;
        let identity = Identity::new(
            email,
            hash.into_string(),
            first_name.to_string(),
            last_name.to_string(),
        );
        self.store.insert(&identity).await?;

        info!(identity_id = %identity.identity_id, "identity registered");
        Ok(identity)
    }

    /// Order matters: the lock check runs before verification so a locked
    /// account rejects even the correct password, and only real mismatches
    /// advance the counter.
    pub async fn authenticate(&self, email: &str, raw_password: &str) -> Result<Identity, AppError> {
        let email = normalize_email(email);

        let Some(identity) = self.store.find_by_email(&email).await? else {
            let _ = verify_password_async(
                Password::new(raw_password.to_string()),
                self.dummy_hash.clone(),
            )
            .await;
            return Err(AppError::InvalidCredentials);
        };

        if let LockState::Locked { .. } = lockout::lock_state(identity.locked_until, Utc::now()) {
            warn!(identity_id = %identity.identity_id, "login attempt on locked account");
            return Err(AppError::AccountLocked);
        }

        let matched = verify_password_async(
            Password::new(raw_password.to_string()),
            PasswordHashString::new(identity.password_hash.clone()),
        )
        .await?;

        if !matched {
            let attempts = self.store.record_failed_attempt(identity.identity_id).await?;
            warn!(identity_id = %identity.identity_id, attempts, "failed login attempt");
            return Err(AppError::InvalidCredentials);
        }

        self.store.reset_attempts(identity.identity_id).await?;
        info!(identity_id = %identity.identity_id, "login succeeded");
        Ok(identity)
    }

    pub async fn change_password(
        &self,
        identity_id: Uuid,
        current_password: &str,
        new_password: &str,
    ) -> Result<(), AppError> {
        let identity = self
            .store
            .find_by_id(identity_id)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

        let current_matches = verify_password_async(
            Password::new(current_password.to_string()),
            PasswordHashString::new(identity.password_hash.clone()),
        )
        .await?;
        if !current_matches {
            return Err(AppError::WrongCurrentPassword);
        }

        let report = PasswordPolicy::validate(new_password, Some(&identity.email));
        if !report.is_valid() {
            return Err(AppError::PolicyViolation(report.messages()));
        }

        // the reuse check covers retained history entries, not the current
        // hash; matching the current hash already fails as "unchanged" below
        for prior in self.store.password_history(identity_id).await? {
            let reused = verify_password_async(
                Password::new(new_password.to_string()),
                PasswordHashString::new(prior),
            )
            .await?;
            if reused {
                return Err(AppError::PasswordReused);
            }
        }
        if current_password == new_password {
            return Err(AppError::PasswordReused);
        }

        let new_hash = hash_password_async(Password::new(new_password.to_string())).await?;
        self.store
            .update_password(identity_id, &identity.password_hash, new_hash.as_str())
            .await?;

        info!(identity_id = %identity_id, "password changed");
        Ok(())
    }
}
