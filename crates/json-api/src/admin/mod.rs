//! Admin endpoints for issuing OTPs and retrieving signed documents.

pub(crate) mod create_otp;
pub(crate) mod download_signed;
mod errors;
pub(crate) mod list_signed;
