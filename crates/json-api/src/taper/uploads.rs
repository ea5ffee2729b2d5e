//! Upload size limit.

use std::sync::Arc;

use salvo::{http::header::CONTENT_LENGTH, prelude::*};
use tracing::warn;

use crate::state::State;

/// Reject bodies declared larger than the configured ceiling with 413 before any parsing, and
/// cap the body reader for the rest of the request.
#[salvo::handler]
pub(crate) async fn limit(
    req: &mut Request,
    depot: &mut Depot,
    res: &mut Response,
    ctrl: &mut FlowCtrl,
) {
    let max_upload_bytes = match depot.obtain::<Arc<State>>() {
        Ok(state) => state.max_upload_bytes,
        Err(_error) => {
            res.render(StatusError::internal_server_error());

            return;
        }
    };

    let declared = req
        .headers()
        .get(CONTENT_LENGTH)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.trim().parse::<u64>().ok());

    if let Some(declared) = declared
        && declared > u64::try_from(max_upload_bytes).unwrap_or(u64::MAX)
    {
        warn!(declared, max_upload_bytes, "rejected oversized upload");

        res.render(StatusError::payload_too_large().brief("Upload is too large"));

        return;
    }

    req.set_secure_max_size(max_upload_bytes);

    ctrl.call_next(req, depot, res).await;
}
