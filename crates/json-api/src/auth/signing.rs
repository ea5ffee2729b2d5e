//! Signing token middleware.

use std::sync::Arc;

use salvo::prelude::*;

use crate::{
    auth::{INVALID_TOKEN_BRIEF, extract_bearer_token},
    extensions::*,
    state::State,
    taper::errors::into_status_error,
};

/// Verify `Authorization: Bearer <signing token>` and stash the resulting grant in the depot.
#[salvo::handler]
pub(crate) async fn handler(
    req: &mut Request,
    depot: &mut Depot,
    res: &mut Response,
    ctrl: &mut FlowCtrl,
) {
    let Some(token) = extract_bearer_token(req) else {
        res.render(StatusError::unauthorized().brief(INVALID_TOKEN_BRIEF));

        return;
    };

    let state = match depot.obtain::<Arc<State>>() {
        Ok(state) => state,
        Err(_error) => {
            res.render(StatusError::internal_server_error());

            return;
        }
    };

    let now = state.app.clock.now();

    let grant = match state.app.signing.authorize(token, now).await {
        Ok(grant) => grant,
        Err(error) => {
            res.render(into_status_error(error));

            return;
        }
    };

    depot.insert_signing_grant(grant);

    ctrl.call_next(req, depot, res).await;
}
