//! OTP Records

use jiff::{SignedDuration, Timestamp};

/// How long an issued OTP can be exchanged for a signing token.
pub const OTP_TTL: SignedDuration = SignedDuration::from_mins(20);

/// OTP Record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OtpRecord {
    pub code: String,
    pub label: String,
    pub created_at: Timestamp,
    pub expires_at: Timestamp,
    pub consumed_at: Option<Timestamp>,
}

impl OtpRecord {
    #[must_use]
    pub fn new(code: String, label: String, now: Timestamp) -> Self {
        Self {
            code,
            label,
            created_at: now,
            expires_at: now + OTP_TTL,
            consumed_at: None,
        }
    }

    /// An OTP is valid strictly before its expiry and only while unconsumed.
    #[must_use]
    pub fn is_valid_at(&self, now: Timestamp) -> bool {
        now < self.expires_at && self.consumed_at.is_none()
    }

    #[must_use]
    pub fn is_expired_at(&self, now: Timestamp) -> bool {
        now >= self.expires_at
    }
}
