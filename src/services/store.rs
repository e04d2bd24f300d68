use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    error::AppError,
    models::Identity,
    services::lockout::{self, LOCKOUT_WINDOW_HOURS, MAX_FAILED_ATTEMPTS},
};

/// Number of prior hashes retained per identity for reuse checks.
pub const PASSWORD_HISTORY_DEPTH: i64 = 5;

/// Emails are matched case-insensitively; every lookup and insert goes
/// through this.
pub fn normalize_email(raw: &str) -> String {
    raw.trim().to_ascii_lowercase()
}

/// Persistence seam for identity records. Lockout counter updates are atomic
/// in every implementation: concurrent failures may not lose increments.
#[async_trait]
pub trait RecordStore: Send + Sync {
    async fn find_by_email(&self, email: &str) -> Result<Option<Identity>, AppError>;
    async fn find_by_id(&self, identity_id: Uuid) -> Result<Option<Identity>, AppError>;
    async fn insert(&self, identity: &Identity) -> Result<(), AppError>;
    /// Applies the failed-login transition and returns the new attempt count.
    async fn record_failed_attempt(&self, identity_id: Uuid) -> Result<i32, AppError>;
    /// Clears the counter and lock, and stamps a successful login.
    async fn reset_attempts(&self, identity_id: Uuid) -> Result<(), AppError>;
    /// Prior hashes, newest first, capped at the history depth.
    async fn password_history(&self, identity_id: Uuid) -> Result<Vec<String>, AppError>;
    /// Swaps in the new hash and pushes the old one onto the history.
    async fn update_password(
        &self,
        identity_id: Uuid,
        old_hash: &str,
        new_hash: &str,
    ) -> Result<(), AppError>;
    async fn health_check(&self) -> Result<(), AppError>;
}

/// Resolves resource ownership for instance-level authorization checks.
#[async_trait]
pub trait OwnershipLookup: Send + Sync {
    async fn owner_of_hotel(&self, hotel_id: Uuid) -> Result<Option<Uuid>, AppError>;
    async fn booking_belongs_to_user(
        &self,
        booking_id: Uuid,
        identity_id: Uuid,
    ) -> Result<bool, AppError>;
}

pub struct PgRecordStore {
    pool: PgPool,
}

impl PgRecordStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RecordStore for PgRecordStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<Identity>, AppError> {
        let identity = sqlx::query_as::<_, Identity>(
            "SELECT * FROM identities WHERE email = $1",
        )
        .bind(normalize_email(email))
        .fetch_optional(&self.pool)
        .await?;
        Ok(identity)
    }

    async fn find_by_id(&self, identity_id: Uuid) -> Result<Option<Identity>, AppError> {
        let identity = sqlx::query_as::<_, Identity>(
            "SELECT * FROM identities WHERE identity_id = $1",
        )
        .bind(identity_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(identity)
    }

    async fn insert(&self, identity: &Identity) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO identities (
                identity_id, email, password_hash, first_name, last_name, role_code,
                active_flag, email_verified, failed_login_attempts, locked_until,
                last_login_utc, password_created_utc, created_utc
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            "#,
        )
        .bind(identity.identity_id)
        .bind(&identity.email)
        .bind(&identity.password_hash)
        .bind(&identity.first_name)
        .bind(&identity.last_name)
        .bind(&identity.role_code)
        .bind(identity.active_flag)
        .bind(identity.email_verified)
        .bind(identity.failed_login_attempts)
        .bind(identity.locked_until)
        .bind(identity.last_login_utc)
        .bind(identity.password_created_utc)
        .bind(identity.created_utc)
        .execute(&self.pool)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db) if db.is_unique_violation() => AppError::DuplicateEmail,
            _ => AppError::StoreUnavailable(e.into()),
        })?;
        Ok(())
    }

    async fn record_failed_attempt(&self, identity_id: Uuid) -> Result<i32, AppError> {
        // Single statement so concurrent failures serialize on the row lock;
        // mirrors lockout::on_failed_attempt.
        let (attempts,): (i32,) = sqlx::query_as(
            r#"
            UPDATE identities SET
                failed_login_attempts = CASE
                    WHEN locked_until IS NOT NULL AND locked_until <= NOW() THEN 1
                    ELSE failed_login_attempts + 1
                END,
                locked_until = CASE
                    WHEN locked_until IS NOT NULL AND locked_until <= NOW() THEN NULL
                    WHEN locked_until IS NULL AND failed_login_attempts + 1 >= $2
                        THEN NOW() + make_interval(hours => $3)
                    ELSE locked_until
                END
            WHERE identity_id = $1
            RETURNING failed_login_attempts
            "#,
        )
        .bind(identity_id)
        .bind(MAX_FAILED_ATTEMPTS)
        .bind(LOCKOUT_WINDOW_HOURS as i32)
        .fetch_one(&self.pool)
        .await?;
        Ok(attempts)
    }

    async fn reset_attempts(&self, identity_id: Uuid) -> Result<(), AppError> {
        sqlx::query(
            r#"
            UPDATE identities
            SET failed_login_attempts = 0, locked_until = NULL, last_login_utc = NOW()
            WHERE identity_id = $1
            "#,
        )
        .bind(identity_id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn password_history(&self, identity_id: Uuid) -> Result<Vec<String>, AppError> {
        let rows: Vec<(String,)> = sqlx::query_as(
            r#"
            SELECT password_hash FROM password_history
            WHERE identity_id = $1
            ORDER BY created_utc DESC
            LIMIT $2
            "#,
        )
        .bind(identity_id)
        .bind(PASSWORD_HISTORY_DEPTH)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(|(hash,)| hash).collect())
    }

    async fn update_password(
        &self,
        identity_id: Uuid,
        old_hash: &str,
        new_hash: &str,
    ) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            UPDATE identities
            SET password_hash = $2, password_created_utc = NOW()
            WHERE identity_id = $1
            "#,
        )
        .bind(identity_id)
        .bind(new_hash)
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r#"
            INSERT INTO password_history (history_id, identity_id, password_hash, created_utc)
            VALUES ($1, $2, $3, NOW())
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(identity_id)
        .bind(old_hash)
        .execute(&mut *tx)
        .await?;

        // keep only the newest N entries per identity
        sqlx::query(
            r#"
            DELETE FROM password_history
            WHERE identity_id = $1
              AND history_id NOT IN (
                  SELECT history_id FROM password_history
                  WHERE identity_id = $1
                  ORDER BY created_utc DESC
                  LIMIT $2
              )
            "#,
        )
        .bind(identity_id)
        .bind(PASSWORD_HISTORY_DEPTH)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(())
    }

    async fn health_check(&self) -> Result<(), AppError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

pub struct PgOwnershipLookup {
    pool: PgPool,
}

impl PgOwnershipLookup {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl OwnershipLookup for PgOwnershipLookup {
    async fn owner_of_hotel(&self, hotel_id: Uuid) -> Result<Option<Uuid>, AppError> {
        let owner: Option<(Uuid,)> =
            sqlx::query_as("SELECT owner_identity_id FROM hotels WHERE hotel_id = $1")
                .bind(hotel_id)
                .fetch_optional(&self.pool)
                .await?;
        Ok(owner.map(|(id,)| id))
    }

    async fn booking_belongs_to_user(
        &self,
        booking_id: Uuid,
        identity_id: Uuid,
    ) -> Result<bool, AppError> {
        let (exists,): (bool,) = sqlx::query_as(
            "SELECT EXISTS(SELECT 1 FROM bookings WHERE booking_id = $1 AND identity_id = $2)",
        )
        .bind(booking_id)
        .bind(identity_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(exists)
    }
}

/// In-memory store used by tests. Shard locks in the map make the lockout
/// transition atomic per identity.
#[derive(Default)]
pub struct MemoryRecordStore {
    identities: DashMap<Uuid, Identity>,
    email_index: DashMap<String, Uuid>,
    history: DashMap<Uuid, Vec<String>>,
}

impl MemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Overwrites the lock timestamp directly; tests use this to simulate the
    /// lock window elapsing.
    pub fn set_locked_until(&self, identity_id: Uuid, until: Option<DateTime<Utc>>) {
        if let Some(mut identity) = self.identities.get_mut(&identity_id) {
            identity.locked_until = until;
        }
    }

    pub fn remove(&self, identity_id: Uuid) {
        if let Some((_, identity)) = self.identities.remove(&identity_id) {
            self.email_index.remove(&identity.email);
        }
    }
}

#[async_trait]
impl RecordStore for MemoryRecordStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<Identity>, AppError> {
        let normalized = normalize_email(email);
        let Some(id) = self.email_index.get(&normalized).map(|entry| *entry) else {
            return Ok(None);
        };
        Ok(self.identities.get(&id).map(|i| i.clone()))
    }

    async fn find_by_id(&self, identity_id: Uuid) -> Result<Option<Identity>, AppError> {
        Ok(self.identities.get(&identity_id).map(|i| i.clone()))
    }

    async fn insert(&self, identity: &Identity) -> Result<(), AppError> {
        if self.email_index.contains_key(&identity.email) {
            return Err(AppError::DuplicateEmail);
        }
        self.email_index
            .insert(identity.email.clone(), identity.identity_id);
        self.identities
            .insert(identity.identity_id, identity.clone());
        Ok(())
    }

    async fn record_failed_attempt(&self, identity_id: Uuid) -> Result<i32, AppError> {
        let mut identity = self
            .identities
            .get_mut(&identity_id)
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;
        let (attempts, locked_until) = lockout::on_failed_attempt(
            identity.failed_login_attempts,
            identity.locked_until,
            Utc::now(),
        );
        identity.failed_login_attempts = attempts;
        identity.locked_until = locked_until;
        Ok(attempts)
    }

    async fn reset_attempts(&self, identity_id: Uuid) -> Result<(), AppError> {
        if let Some(mut identity) = self.identities.get_mut(&identity_id) {
            identity.failed_login_attempts = 0;
            identity.locked_until = None;
            identity.last_login_utc = Some(Utc::now());
        }
        Ok(())
    }

    async fn password_history(&self, identity_id: Uuid) -> Result<Vec<String>, AppError> {
        Ok(self
            .history
            .get(&identity_id)
            .map(|hashes| hashes.iter().rev().cloned().collect())
            .unwrap_or_default())
    }

    async fn update_password(
        &self,
        identity_id: Uuid,
        old_hash: &str,
        new_hash: &str,
    ) -> Result<(), AppError> {
        {
            let mut identity = self
                .identities
                .get_mut(&identity_id)
                .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;
            identity.password_hash = new_hash.to_string();
            identity.password_created_utc = Utc::now();
        }
        let mut history = self.history.entry(identity_id).or_default();
        history.push(old_hash.to_string());
        while history.len() > PASSWORD_HISTORY_DEPTH as usize {
            history.remove(0);
        }
        Ok(())
    }

    async fn health_check(&self) -> Result<(), AppError> {
        Ok(())
    }
}

/// In-memory ownership tables for tests. Public maps so fixtures can seed
/// them directly.
#[derive(Default)]
pub struct MemoryOwnership {
    pub hotels: DashMap<Uuid, Uuid>,
    pub bookings: DashMap<Uuid, Uuid>,
}

impl MemoryOwnership {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl OwnershipLookup for MemoryOwnership {
    async fn owner_of_hotel(&self, hotel_id: Uuid) -> Result<Option<Uuid>, AppError> {
        Ok(self.hotels.get(&hotel_id).map(|owner| *owner))
    }

    async fn booking_belongs_to_user(
        &self,
        booking_id: Uuid,
        identity_id: Uuid,
    ) -> Result<bool, AppError> {
        Ok(self
            .bookings
            .get(&booking_id)
            .map(|owner| *owner == identity_id)
            .unwrap_or(false))
    }
}
