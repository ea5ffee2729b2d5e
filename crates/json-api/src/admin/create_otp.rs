//! Create OTP Handler

use std::sync::Arc;

use salvo::{oapi::ToSchema, prelude::*};
use serde::{Deserialize, Serialize};

use crate::{admin::errors::otps_status_error, extensions::*, state::State};

const FORWARDED_PROTO_HEADER: &str = "x-forwarded-proto";
const FORWARDED_HOST_HEADER: &str = "x-forwarded-host";

/// Create OTP Request
#[derive(Debug, Default, Serialize, Deserialize, ToSchema)]
pub(crate) struct CreateOtpRequest {
    /// Free text recorded against documents signed with the OTP
    #[serde(default)]
    pub label: Option<String>,
}

/// OTP Created Response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct OtpCreatedResponse {
    pub ok: bool,

    /// Six digit code to hand to the signer
    pub otp: String,

    pub expires_at: String,

    /// The signing page the signer should open
    pub url: String,
}

/// Create OTP Handler
#[endpoint(
    tags("admin"),
    summary = "Issue OTP",
    request_body = CreateOtpRequest,
    security(("admin_key" = [])),
    responses(
        (status_code = StatusCode::CREATED, description = "OTP issued"),
        (status_code = StatusCode::UNAUTHORIZED, description = "Missing or invalid admin key"),
        (status_code = StatusCode::SERVICE_UNAVAILABLE, description = "OTP registry unavailable"),
    ),
)]
pub(crate) async fn handler(
    req: &mut Request,
    depot: &mut Depot,
    res: &mut Response,
) -> Result<Json<OtpCreatedResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let label = parse_request(req).await?.label.unwrap_or_default();

    let otp = state
        .app
        .otps
        .create_otp(&label, state.app.clock.now())
        .await
        .map_err(otps_status_error)?;

    res.status_code(StatusCode::CREATED);

    Ok(Json(OtpCreatedResponse {
        ok: true,
        otp: otp.code,
        expires_at: otp.expires_at.to_string(),
        url: format!("{}/taper", public_base_url(state, req)),
    }))
}

/// The body is optional: an empty payload issues an unlabelled OTP.
async fn parse_request(req: &mut Request) -> Result<CreateOtpRequest, StatusError> {
    let payload = req.payload().await.or_400("Invalid request body")?;

    if payload.trim_ascii().is_empty() {
        return Ok(CreateOtpRequest::default());
    }

    serde_json::from_slice(payload).or_400("Request body must be a JSON object")
}

/// Configured base URL, else forwarded headers, else the request's own host.
fn public_base_url(state: &State, req: &Request) -> String {
    if let Some(base) = state.public_base_url.as_ref() {
        return base.clone();
    }

    let scheme = first_header_value(req, FORWARDED_PROTO_HEADER)
        .map(ToString::to_string)
        .unwrap_or_else(|| req.uri().scheme_str().unwrap_or("http").to_string());

    let host = first_header_value(req, FORWARDED_HOST_HEADER)
        .or_else(|| first_header_value(req, "host"))
        .or_else(|| req.uri().authority().map(|authority| authority.as_str()))
        .unwrap_or("localhost")
        .to_string();

    format!("{scheme}://{host}")
}

fn first_header_value<'a>(req: &'a Request, name: &str) -> Option<&'a str> {
    req.headers()
        .get(name)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(',').next())
        .map(str::trim)
        .filter(|value| !value.is_empty())
}
