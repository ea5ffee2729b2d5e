//! Shared application domain, persistence and storage modules for OTP-gated PDF signing.

pub mod clock;
pub mod context;
pub mod database;
pub mod domain;
pub mod storage;

#[cfg(any(test, feature = "fixtures"))]
pub mod fixtures;

mod uuids;
