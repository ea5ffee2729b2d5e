//! Signing flow errors.

use thiserror::Error;
use tokio::task::JoinError;

use crate::{
    domain::{
        ledger::LedgerServiceError,
        otps::OtpsServiceError,
        signatures::{OverlayError, SignatureImageError},
        tokens::SigningTokenError,
    },
    storage::StorageError,
};

#[derive(Debug, Error)]
pub enum SigningServiceError {
    #[error("otp is required")]
    MissingOtp,

    #[error("otp is invalid or expired")]
    InvalidOtp,

    #[error("signing token rejected")]
    Unauthorized(#[source] Option<SigningTokenError>),

    #[error("failed to issue signing token")]
    Token(#[source] SigningTokenError),

    #[error("invalid signature image")]
    InvalidSignatureImage(#[source] SignatureImageError),

    #[error("failed to place signature on pdf")]
    Overlay(#[source] OverlayError),

    #[error("failed to store signed pdf")]
    Storage(#[source] StorageError),

    #[error("otp registry unavailable")]
    Otps(#[source] OtpsServiceError),

    #[error("failed to record signed document")]
    Ledger(#[source] LedgerServiceError),

    #[error("signing task failed")]
    Task(#[source] JoinError),
}

impl From<OtpsServiceError> for SigningServiceError {
    fn from(error: OtpsServiceError) -> Self {
        Self::Otps(error)
    }
}

impl From<LedgerServiceError> for SigningServiceError {
    fn from(error: LedgerServiceError) -> Self {
        Self::Ledger(error)
    }
}

impl From<StorageError> for SigningServiceError {
    fn from(error: StorageError) -> Self {
        Self::Storage(error)
    }
}

impl From<SignatureImageError> for SigningServiceError {
    fn from(error: SignatureImageError) -> Self {
        Self::InvalidSignatureImage(error)
    }
}

impl From<OverlayError> for SigningServiceError {
    fn from(error: OverlayError) -> Self {
        Self::Overlay(error)
    }
}
