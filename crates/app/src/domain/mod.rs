//! Taper Domain Concerns

pub mod ledger;
pub mod otps;
pub mod signatures;
pub mod signing;
pub mod tokens;
