//! OTP registry errors.

use sqlx::Error;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum OtpsServiceError {
    #[error("could not allocate a unique otp code")]
    Exhausted,

    #[error("storage error")]
    Sql(#[source] Error),
}

impl From<Error> for OtpsServiceError {
    fn from(error: Error) -> Self {
        Self::Sql(error)
    }
}
