//! Short-lived signing tokens exchanged for a verified OTP.

pub mod errors;
pub mod secret;
pub mod service;

pub use errors::SigningTokenError;
pub use secret::SigningTokenSecret;
pub use service::*;
