//! One-time passcodes issued by an admin to unlock a signing session.

pub mod code;
pub mod errors;
mod memory;
pub mod records;
mod repository;
pub mod service;

pub use errors::OtpsServiceError;
pub use memory::InMemoryOtpsService;
pub use service::*;
