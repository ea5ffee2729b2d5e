//! Taper signing endpoints.

pub(crate) mod errors;
mod form;
pub(crate) mod sign;
pub(crate) mod uploads;
pub(crate) mod verify;
