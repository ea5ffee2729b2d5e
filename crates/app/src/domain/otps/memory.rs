//! In-process OTP registry.

use std::collections::HashMap;

use async_trait::async_trait;
use jiff::Timestamp;
use tokio::sync::RwLock;
use tracing::debug;

use crate::domain::otps::{
    code::generate_otp_code,
    errors::OtpsServiceError,
    records::OtpRecord,
    service::{MAX_CODE_ATTEMPTS, OtpsService},
};

/// OTP registry held in memory, for deployments without a database.
#[derive(Debug, Default)]
pub struct InMemoryOtpsService {
    entries: RwLock<HashMap<String, OtpRecord>>,
}

impl InMemoryOtpsService {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    async fn create_with<F>(
        &self,
        label: &str,
        now: Timestamp,
        mut generate: F,
    ) -> Result<OtpRecord, OtpsServiceError>
    where
        F: FnMut() -> String + Send,
    {
        let label = label.trim().to_string();
        let mut entries = self.entries.write().await;

        entries.retain(|_, otp| !otp.is_expired_at(now));

        for attempt in 1..=MAX_CODE_ATTEMPTS {
            let code = generate();

            if entries.contains_key(&code) {
                debug!(attempt, "otp code collided with a live entry");

                continue;
            }

            let otp = OtpRecord::new(code.clone(), label, now);

            entries.insert(code, otp.clone());

            return Ok(otp);
        }

        Err(OtpsServiceError::Exhausted)
    }
}

#[async_trait]
impl OtpsService for InMemoryOtpsService {
    async fn create_otp(&self, label: &str, now: Timestamp) -> Result<OtpRecord, OtpsServiceError> {
        self.create_with(label, now, generate_otp_code).await
    }

    async fn verify_otp(
        &self,
        code: &str,
        now: Timestamp,
    ) -> Result<Option<OtpRecord>, OtpsServiceError> {
        let entries = self.entries.read().await;

        Ok(entries.get(code).filter(|otp| otp.is_valid_at(now)).cloned())
    }

    async fn find_otp(&self, code: &str) -> Result<Option<OtpRecord>, OtpsServiceError> {
        Ok(self.entries.read().await.get(code).cloned())
    }

    async fn consume_otp(&self, code: &str, now: Timestamp) -> Result<bool, OtpsServiceError> {
        let mut entries = self.entries.write().await;

        let Some(otp) = entries.get_mut(code).filter(|otp| otp.consumed_at.is_none()) else {
            return Ok(false);
        };

        otp.consumed_at = Some(now);

        Ok(true)
    }

    async fn release_otp(
        &self,
        code: &str,
        consumed_at: Timestamp,
    ) -> Result<bool, OtpsServiceError> {
        let mut entries = self.entries.write().await;

        let Some(otp) = entries
            .get_mut(code)
            .filter(|otp| otp.consumed_at == Some(consumed_at))
        else {
            return Ok(false);
        };

        otp.consumed_at = None;

        Ok(true)
    }

    async fn purge_expired(&self, now: Timestamp) -> Result<u64, OtpsServiceError> {
        let mut entries = self.entries.write().await;
        let before = entries.len();

        entries.retain(|_, otp| !otp.is_expired_at(now));

        Ok(u64::try_from(before - entries.len()).unwrap_or(u64::MAX))
    }
}
