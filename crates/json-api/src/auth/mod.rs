//! Authentication

pub(crate) mod admin;
mod admin_key;
mod bearer;
pub(crate) mod signing;

pub(crate) use admin_key::AdminKey;
pub(crate) use bearer::extract_bearer_token;

/// The one message every rejected signing token gets, whatever the reason.
pub(crate) const INVALID_TOKEN_BRIEF: &str = "Signing token is invalid or has expired";
