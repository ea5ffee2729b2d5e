//! App Router

use salvo::Router;

use crate::{admin, auth, healthcheck, observability, taper};

pub(crate) fn app_router() -> Router {
    Router::new()
        .push(Router::with_path("healthcheck").get(healthcheck::handler))
        .push(Router::with_path("metrics").get(observability::metrics_handler))
        .push(
            Router::with_path("taper")
                .push(Router::with_path("verify").post(taper::verify::handler))
                .push(
                    Router::with_path("sign")
                        .hoop(taper::uploads::limit)
                        .hoop(auth::signing::handler)
                        .post(taper::sign::handler),
                ),
        )
        .push(
            Router::with_path("admin/taper")
                .hoop(auth::admin::handler)
                .push(Router::with_path("otp").post(admin::create_otp::handler))
                .push(
                    Router::with_path("signed")
                        .get(admin::list_signed::handler)
                        .push(Router::with_path("{id}").get(admin::download_signed::handler)),
                ),
        )
}
