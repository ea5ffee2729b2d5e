//! Sign PDF Handler

use std::sync::Arc;

use salvo::{
    http::{
        form::{FilePart, FormData},
        header::{CONTENT_DISPOSITION, CONTENT_TYPE},
    },
    prelude::*,
};
use tokio::fs;

use taper_app::domain::{
    signatures::SignaturePlacement,
    signing::{
        SigningServiceError,
        data::{SignRequest, SignedPdf},
    },
};

use crate::{
    extensions::*,
    observability::{SigningOutcome, observe_signing},
    state::State,
    taper::{
        errors::into_status_error,
        form::{parse_flag, select_parts},
    },
};

const MISSING_PARTS_BRIEF: &str = "A PDF file and a signature image are both required";

/// Sign PDF Handler
///
/// Stamps the uploaded signature onto the last page of the uploaded PDF. Unless
/// `preview_only` is set, the result is archived and recorded.
#[endpoint(
    tags("taper"),
    summary = "Sign PDF",
    security(("signing_token" = [])),
    responses(
        (status_code = StatusCode::OK, description = "Signed PDF", content_type = "application/pdf"),
        (status_code = StatusCode::BAD_REQUEST, description = "Missing part or invalid signature image"),
        (status_code = StatusCode::UNAUTHORIZED, description = "Signing token invalid or expired"),
        (status_code = StatusCode::PAYLOAD_TOO_LARGE, description = "Upload too large"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Failed to place signature"),
    ),
)]
pub(crate) async fn handler(
    req: &mut Request,
    depot: &mut Depot,
    res: &mut Response,
) -> Result<(), StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let grant = depot.signing_grant_or_401()?;

    let form = req
        .form_data()
        .await
        .or_400("Invalid multipart body")?;

    let parts = select_parts(form);

    let (Some(pdf_part), Some(signature_part)) = (parts.pdf, parts.signature) else {
        observe_signing(SigningOutcome::Rejected);

        return Err(StatusError::bad_request().brief(MISSING_PARTS_BRIEF));
    };

    let request = SignRequest {
        pdf: read_part(pdf_part).await?,
        pdf_filename: pdf_part.name().map(ToString::to_string),
        signature: read_part(signature_part).await?,
        placement: SignaturePlacement::parse(
            field(form, "x_ratio"),
            field(form, "y_ratio"),
            field(form, "scale_ratio"),
        ),
        preview_only: parse_flag(field(form, "preview_only")),
    };

    let now = state.app.clock.now();

    let signed = match state.app.signing.sign(grant, request, now).await {
        Ok(signed) => signed,
        Err(error) => {
            observe_signing(outcome_of(&error));

            return Err(into_status_error(error));
        }
    };

    observe_signing(if signed.document.is_some() {
        SigningOutcome::Stored
    } else {
        SigningOutcome::Preview
    });

    write_pdf(res, signed)
}

fn field<'a>(form: &'a FormData, name: &str) -> Option<&'a str> {
    form.fields.get(name).map(String::as_str)
}

async fn read_part(part: &FilePart) -> Result<Vec<u8>, StatusError> {
    fs::read(part.path())
        .await
        .or_500("failed to read spooled upload")
}

fn outcome_of(error: &SigningServiceError) -> SigningOutcome {
    match error {
        SigningServiceError::Unauthorized(_) | SigningServiceError::InvalidSignatureImage(_) => {
            SigningOutcome::Rejected
        }
        _ => SigningOutcome::Failed,
    }
}

fn write_pdf(res: &mut Response, signed: SignedPdf) -> Result<(), StatusError> {
    let disposition = format!(
        "{}; filename=\"{}\"",
        signed.disposition.as_str(),
        signed.filename
    );

    res.add_header(CONTENT_TYPE, "application/pdf", true)
        .or_500("failed to set content type header")?
        .add_header(CONTENT_DISPOSITION, disposition, true)
        .or_500("failed to set content disposition header")?
        .write_body(signed.bytes)
        .or_500("failed to write signed pdf")
}
