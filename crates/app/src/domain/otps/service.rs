//! OTP registry service.

use async_trait::async_trait;
use jiff::Timestamp;
use mockall::automock;
use sqlx::PgPool;
use tracing::{debug, warn};

use crate::domain::otps::{
    code::{generate_otp_code, is_well_formed},
    errors::OtpsServiceError,
    records::OtpRecord,
    repository::PgOtpsRepository,
};

/// Upper bound on regenerations when a fresh code collides with a live one.
pub const MAX_CODE_ATTEMPTS: usize = 20;

#[derive(Debug, Clone)]
pub struct PgOtpsService {
    repository: PgOtpsRepository,
}

impl PgOtpsService {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self {
            repository: PgOtpsRepository::new(pool),
        }
    }
}

#[async_trait]
impl OtpsService for PgOtpsService {
    async fn create_otp(&self, label: &str, now: Timestamp) -> Result<OtpRecord, OtpsServiceError> {
        let label = label.trim().to_string();

        for attempt in 1..=MAX_CODE_ATTEMPTS {
            let candidate = OtpRecord::new(generate_otp_code(), label.clone(), now);

            if let Some(created) = self.repository.insert_otp(&candidate).await? {
                return Ok(created);
            }

            debug!(attempt, "otp code collided with a live entry");
        }

        warn!("exhausted otp code attempts");

        Err(OtpsServiceError::Exhausted)
    }

    async fn verify_otp(
        &self,
        code: &str,
        now: Timestamp,
    ) -> Result<Option<OtpRecord>, OtpsServiceError> {
        if !is_well_formed(code) {
            return Ok(None);
        }

        let otp = self.repository.find_otp(code).await?;

        Ok(otp.filter(|otp| otp.is_valid_at(now)))
    }

    async fn find_otp(&self, code: &str) -> Result<Option<OtpRecord>, OtpsServiceError> {
        if !is_well_formed(code) {
            return Ok(None);
        }

        Ok(self.repository.find_otp(code).await?)
    }

    async fn consume_otp(&self, code: &str, now: Timestamp) -> Result<bool, OtpsServiceError> {
        Ok(self.repository.consume_otp(code, now).await? > 0)
    }

    async fn release_otp(
        &self,
        code: &str,
        consumed_at: Timestamp,
    ) -> Result<bool, OtpsServiceError> {
        Ok(self.repository.release_otp(code, consumed_at).await? > 0)
    }

    async fn purge_expired(&self, now: Timestamp) -> Result<u64, OtpsServiceError> {
        Ok(self.repository.purge_expired(now).await?)
    }
}

#[automock]
#[async_trait]
pub trait OtpsService: Send + Sync {
    /// Issue a new OTP carrying `label`, valid for twenty minutes from `now`.
    async fn create_otp(&self, label: &str, now: Timestamp) -> Result<OtpRecord, OtpsServiceError>;

    /// Look up `code` and return it only while it is still valid. Never mutates state.
    async fn verify_otp(
        &self,
        code: &str,
        now: Timestamp,
    ) -> Result<Option<OtpRecord>, OtpsServiceError>;

    /// Raw lookup, ignoring expiry and consumption.
    async fn find_otp(&self, code: &str) -> Result<Option<OtpRecord>, OtpsServiceError>;

    /// Mark an OTP as used. Returns `false` when it is unknown or was already consumed.
    ///
    /// Expiry is not checked here: a signing token may outlive the OTP it was exchanged for.
    async fn consume_otp(&self, code: &str, now: Timestamp) -> Result<bool, OtpsServiceError>;

    /// Undo a [`consume_otp`](OtpsService::consume_otp) made at `consumed_at`, so a signing
    /// that failed after consuming can be retried. Returns `false` when that consumption is
    /// not the current one.
    async fn release_otp(
        &self,
        code: &str,
        consumed_at: Timestamp,
    ) -> Result<bool, OtpsServiceError>;

    /// Drop entries whose expiry is at or before `now`, returning how many were removed.
    async fn purge_expired(&self, now: Timestamp) -> Result<u64, OtpsServiceError>;
}
