//! Download Signed Document Handler

use std::sync::Arc;

use salvo::{
    http::header::{CONTENT_DISPOSITION, CONTENT_TYPE},
    oapi::extract::PathParam,
    prelude::*,
};
use uuid::Uuid;

use crate::{
    admin::errors::{ledger_status_error, storage_status_error},
    extensions::*,
    state::State,
};

/// Download Signed Document Handler
///
/// Serves an archived signed PDF as an attachment.
#[endpoint(
    tags("admin"),
    summary = "Download Signed Document",
    security(("admin_key" = [])),
    responses(
        (status_code = StatusCode::OK, description = "Signed PDF", content_type = "application/pdf"),
        (status_code = StatusCode::NOT_FOUND, description = "Unknown document"),
    ),
)]
pub(crate) async fn handler(
    id: PathParam<Uuid>,
    depot: &mut Depot,
    res: &mut Response,
) -> Result<(), StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;

    let document = state
        .app
        .ledger
        .get_document(id.into_inner().into())
        .await
        .map_err(ledger_status_error)?
        .ok_or_else(|| StatusError::not_found().brief("Signed document not found"))?;

    let bytes = state
        .app
        .storage
        .load(&document.stored_path)
        .await
        .map_err(storage_status_error)?;

    res.add_header(CONTENT_TYPE, "application/pdf", true)
        .or_500("failed to set content type header")?
        .add_header(
            CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", document.filename),
            true,
        )
        .or_500("failed to set content disposition header")?
        .write_body(bytes)
        .or_500("failed to write signed pdf")
}
