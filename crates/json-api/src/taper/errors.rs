//! Taper Errors

use salvo::http::StatusError;
use tracing::{error, warn};

use taper_app::domain::signing::SigningServiceError;

use crate::auth::INVALID_TOKEN_BRIEF;

pub(crate) const OVERLAY_FAILED_BRIEF: &str = "Failed to place the signature on the PDF. Make sure the PDF is not locked and the signature is a valid PNG or JPG image.";

pub(crate) fn into_status_error(error: SigningServiceError) -> StatusError {
    match error {
        SigningServiceError::MissingOtp => StatusError::bad_request().brief("OTP is required"),
        SigningServiceError::InvalidOtp => {
            StatusError::unauthorized().brief("OTP is invalid or has expired")
        }
        SigningServiceError::Unauthorized(_) => {
            StatusError::unauthorized().brief(INVALID_TOKEN_BRIEF)
        }
        SigningServiceError::InvalidSignatureImage(source) => {
            warn!("rejected signature image: {source}");

            StatusError::bad_request().brief("Invalid signature image")
        }
        SigningServiceError::Token(source) => {
            error!("failed to issue signing token: {source}");

            StatusError::internal_server_error().brief("Failed to issue signing token")
        }
        SigningServiceError::Overlay(source) => {
            error!("failed to overlay signature: {source}");

            StatusError::internal_server_error().brief(OVERLAY_FAILED_BRIEF)
        }
        SigningServiceError::Storage(source) => {
            error!("failed to store signed pdf: {source}");

            StatusError::internal_server_error().brief("Failed to store signed PDF")
        }
        SigningServiceError::Ledger(source) => {
            error!("failed to record signed document: {source}");

            StatusError::internal_server_error().brief("Failed to record signed document")
        }
        SigningServiceError::Otps(source) => {
            error!("otp registry unavailable: {source}");

            StatusError::service_unavailable().brief("Signing service unavailable")
        }
        SigningServiceError::Task(source) => {
            error!("signing task failed: {source}");

            StatusError::internal_server_error()
        }
    }
}
