//! Admin key middleware.

use std::sync::Arc;

use salvo::prelude::*;
use tracing::warn;

use crate::{auth::extract_bearer_token, state::State};

pub(crate) const ADMIN_KEY_HEADER: &str = "x-admin-key";

#[salvo::handler]
pub(crate) async fn handler(
    req: &mut Request,
    depot: &mut Depot,
    res: &mut Response,
    ctrl: &mut FlowCtrl,
) {
    let state = match depot.obtain::<Arc<State>>() {
        Ok(state) => state,
        Err(_error) => {
            res.render(StatusError::internal_server_error());

            return;
        }
    };

    let Some(admin_key) = state.admin_key.as_ref() else {
        res.render(StatusError::service_unavailable().brief("Admin access is not configured"));

        return;
    };

    let presented = extract_bearer_token(req).or_else(|| {
        req.headers()
            .get(ADMIN_KEY_HEADER)
            .and_then(|value| value.to_str().ok())
    });

    let Some(presented) = presented else {
        res.render(StatusError::unauthorized().brief("Missing admin credentials"));

        return;
    };

    if !admin_key.matches(presented) {
        warn!("rejected admin credentials");

        res.render(StatusError::unauthorized().brief("Invalid admin credentials"));

        return;
    }

    ctrl.call_next(req, depot, res).await;
}
