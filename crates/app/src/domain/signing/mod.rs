//! The end-to-end signing flow: OTP exchange, token checks, stamping and archiving.

pub mod data;
pub mod errors;
pub mod filename;
pub mod service;

pub use errors::SigningServiceError;
pub use service::*;
