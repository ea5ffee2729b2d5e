//! Signing token errors.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SigningTokenError {
    #[error("signing token secret must not be empty")]
    EmptySecret,

    #[error("signing token secret cannot be used as an hmac key")]
    InvalidKey,

    #[error("signing token format is invalid")]
    InvalidFormat,

    #[error("signing token signature does not match")]
    InvalidSignature,

    #[error("signing token claims are invalid")]
    InvalidClaims,

    #[error("signing token has expired")]
    Expired,

    #[error("failed to encode signing token claims")]
    Encode(#[source] serde_json::Error),
}
