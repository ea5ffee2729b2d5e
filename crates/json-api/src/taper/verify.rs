//! Verify OTP Handler

use std::sync::Arc;

use salvo::{
    oapi::{ToSchema, extract::JsonBody},
    prelude::*,
};
use serde::{Deserialize, Serialize};

use crate::{
    extensions::*,
    observability::observe_otp_exchange,
    state::State,
    taper::errors::into_status_error,
};

/// Verify OTP Request
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct VerifyOtpRequest {
    /// The six digit code handed out by the admin
    #[serde(default)]
    pub otp: String,
}

/// Verify OTP Response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct VerifyOtpResponse {
    pub ok: bool,

    /// Bearer token for `/taper/sign`, valid for twenty minutes
    pub token: String,
}

/// Verify OTP Handler
///
/// Exchanges a valid OTP for a short-lived signing token. The OTP stays valid.
#[endpoint(
    tags("taper"),
    summary = "Exchange OTP for signing token",
    responses(
        (status_code = StatusCode::OK, description = "Signing token issued"),
        (status_code = StatusCode::BAD_REQUEST, description = "OTP missing"),
        (status_code = StatusCode::UNAUTHORIZED, description = "OTP invalid or expired"),
        (status_code = StatusCode::SERVICE_UNAVAILABLE, description = "OTP registry unavailable"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
pub(crate) async fn handler(
    json: JsonBody<VerifyOtpRequest>,
    depot: &mut Depot,
) -> Result<Json<VerifyOtpResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let now = state.app.clock.now();

    let result = state
        .app
        .signing
        .exchange_otp(&json.into_inner().otp, now)
        .await;

    observe_otp_exchange(result.is_ok());

    let issued = result.map_err(into_status_error)?;

    Ok(Json(VerifyOtpResponse {
        ok: true,
        token: issued.token,
    }))
}
