//! Request-level logging and request IDs.

mod request_ids;
mod spans;

use std::time::{Duration, Instant};

use salvo::{
    Request, handler,
    http::{StatusCode, header::CONTENT_LENGTH},
    prelude::{Depot, FlowCtrl, Response},
};
use tracing::Instrument as _;
use tracing::{error, info, warn};

use super::{metrics, settings};

const REQUEST_ID_DEPOT_KEY: &str = "request_id";

/// What the completion log lines report about one request.
#[derive(Debug)]
struct Completed<'a> {
    request_id: &'a str,
    method: &'a str,
    route: &'a str,
    status: StatusCode,
    request_bytes: u64,
    elapsed: Duration,
}

impl Completed<'_> {
    fn log(&self, slow_after: Duration) {
        let status = self.status.as_u16();
        let duration_ms = self.elapsed.as_millis();

        info!(
            status,
            duration_ms,
            request_bytes = self.request_bytes,
            "request.completed"
        );

        if self.status.is_server_error() {
            error!(
                status,
                method = self.method,
                route = self.route,
                request_id = self.request_id,
                "server error response"
            );
        } else if self.status.is_client_error() {
            warn!(
                status,
                method = self.method,
                route = self.route,
                request_id = self.request_id,
                "client error response"
            );
        }

        if self.elapsed > slow_after {
            warn!(
                method = self.method,
                route = self.route,
                request_id = self.request_id,
                duration_ms,
                threshold_ms = slow_after.as_millis(),
                "slow request detected"
            );
        }
    }
}

/// Assigns a request ID, records request metrics and logs each completed request inside an
/// `http.request` span. Scrapes of `/metrics` pass straight through.
#[handler]
pub(crate) async fn request_logging(
    req: &mut Request,
    depot: &mut Depot,
    res: &mut Response,
    ctrl: &mut FlowCtrl,
) {
    if req.uri().path() == "/metrics" {
        ctrl.call_next(req, depot, res).await;
        return;
    }

    let started = Instant::now();

    let request_id =
        request_ids::resolve_request_id(req.header::<String>(request_ids::REQUEST_ID_HEADER));

    depot.insert(REQUEST_ID_DEPOT_KEY, request_id.clone());
    request_ids::set_request_id_header(res, &request_id);

    let method = req.method().to_string();
    let route = spans::route_label(req.uri().path());
    let request_bytes = req.header::<u64>(CONTENT_LENGTH).unwrap_or_default();
    let _in_flight_request = metrics::InFlightRequestGuard::track();

    // Query strings are never logged.
    let span = tracing::info_span!(
        parent: None,
        "http.request",
        request_id = %request_id,
        method = %method,
        route = %route,
        remote_addr = %req.remote_addr(),
        status = tracing::field::Empty,
        duration_ms = tracing::field::Empty
    );

    ctrl.call_next(req, depot, res)
        .instrument(span.clone())
        .await;

    let completed = Completed {
        request_id: &request_id,
        method: &method,
        route: &route,
        status: request_ids::response_status_or_ok(res.status_code),
        request_bytes,
        elapsed: started.elapsed(),
    };

    metrics::observe_request(
        completed.method,
        completed.route,
        completed.status.as_u16(),
        completed.elapsed.as_secs_f64(),
    );

    span.record("status", completed.status.as_u16());
    span.record("duration_ms", completed.elapsed.as_millis());
    span.in_scope(|| completed.log(settings::slow_request_threshold()));
}
