//! Admin Errors

use salvo::http::StatusError;
use tracing::error;

use taper_app::{
    domain::{ledger::LedgerServiceError, otps::OtpsServiceError},
    storage::StorageError,
};

pub(super) fn otps_status_error(error: OtpsServiceError) -> StatusError {
    match error {
        OtpsServiceError::Exhausted => {
            error!("could not find a free otp code");

            StatusError::service_unavailable().brief("No OTP code available, try again")
        }
        OtpsServiceError::Sql(source) => {
            error!("failed to create otp: {source}");

            StatusError::service_unavailable().brief("OTP registry unavailable")
        }
    }
}

pub(super) fn ledger_status_error(error: LedgerServiceError) -> StatusError {
    error!("failed to read signed document ledger: {error}");

    StatusError::service_unavailable().brief("Signed document ledger unavailable")
}

pub(super) fn storage_status_error(error: StorageError) -> StatusError {
    match error {
        StorageError::NotFound => {
            error!("ledger entry points at a missing file");

            StatusError::not_found().brief("Signed document file is missing")
        }
        StorageError::InvalidPath(path) => {
            error!(path, "ledger entry has an invalid stored path");

            StatusError::internal_server_error()
        }
        StorageError::Io(source) => {
            error!("failed to read signed document: {source}");

            StatusError::internal_server_error()
        }
    }
}
