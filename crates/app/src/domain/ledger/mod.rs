//! Ledger of completed (non-preview) signings.

pub mod data;
pub mod errors;
mod memory;
pub mod records;
mod repository;
pub mod service;

pub use errors::LedgerServiceError;
pub use memory::InMemoryLedgerService;
pub use service::*;
