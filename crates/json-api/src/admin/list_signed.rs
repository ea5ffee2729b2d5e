//! List Signed Documents Handler

use std::sync::Arc;

use salvo::{oapi::ToSchema, prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use taper_app::domain::ledger::records::SignedDocumentRecord;

use crate::{admin::errors::ledger_status_error, extensions::*, state::State};

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct SignedDocumentResponse {
    pub id: Uuid,

    /// The OTP the document was signed under
    pub otp_code: String,

    pub label: String,

    /// Filename handed to the signer
    pub filename: String,

    pub created_at: String,

    /// Admin route serving the archived PDF
    pub download_url: String,
}

impl From<SignedDocumentRecord> for SignedDocumentResponse {
    fn from(document: SignedDocumentRecord) -> Self {
        let id: Uuid = document.uuid.into();

        SignedDocumentResponse {
            id,
            otp_code: document.otp_code,
            label: document.label,
            filename: document.filename,
            created_at: document.created_at.to_string(),
            download_url: format!("/admin/taper/signed/{id}"),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct SignedDocumentsResponse {
    pub ok: bool,
    pub docs: Vec<SignedDocumentResponse>,
}

/// List Signed Documents Handler
///
/// Every archived signing, newest first.
#[endpoint(
    tags("admin"),
    summary = "List Signed Documents",
    security(("admin_key" = []))
)]
pub(crate) async fn handler(depot: &mut Depot) -> Result<Json<SignedDocumentsResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;

    let docs = state
        .app
        .ledger
        .list_documents()
        .await
        .map_err(ledger_status_error)?
        .into_iter()
        .map(Into::into)
        .collect();

    Ok(Json(SignedDocumentsResponse { ok: true, docs }))
}

#[cfg(test)]
mod tests {
    use jiff::{SignedDuration, Timestamp};
    use salvo::{
        affix_state::inject,
        test::{ResponseExt, TestClient},
    };
    use taper_app::domain::ledger::{LedgerServiceError, records::SignedDocumentUuid};
    use testresult::TestResult;

    use crate::test_helpers::MockApp;

    use super::*;

    fn make_service(app: MockApp) -> Service {
        Service::new(
            Router::new()
                .hoop(inject(app.into_state().into_shared()))
                .push(Router::with_path("admin/taper/signed").get(handler)),
        )
    }

    fn document(label: &str, created_at: Timestamp) -> SignedDocumentRecord {
        let uuid = SignedDocumentUuid::new();

        SignedDocumentRecord {
            uuid,
            otp_code: "123456".to_string(),
            label: label.to_string(),
            filename: "Contract-001-signed.pdf".to_string(),
            stored_path: format!("signed/{uuid}-Contract-001-signed.pdf"),
            created_at,
        }
    }

    #[tokio::test]
    async fn test_lists_documents_with_download_links() -> TestResult {
        let newer = document("second", Timestamp::UNIX_EPOCH + SignedDuration::from_secs(60));
        let older = document("first", Timestamp::UNIX_EPOCH);
        let newer_id = newer.uuid;

        let mut app = MockApp::default();

        app.ledger.checkpoint();
        app.ledger
            .expect_list_documents()
            .once()
            .return_once(move || Ok(vec![newer, older]));

        let mut res = TestClient::get("http://example.com/admin/taper/signed")
            .send(&make_service(app))
            .await;

        let body: SignedDocumentsResponse = res.take_json().await?;

        assert_eq!(res.status_code, Some(StatusCode::OK));
        assert!(body.ok);
        assert_eq!(
            body.docs.iter().map(|doc| doc.label.as_str()).collect::<Vec<_>>(),
            ["second", "first"]
        );
        assert_eq!(
            body.docs.first().map(|doc| doc.download_url.clone()),
            Some(format!("/admin/taper/signed/{newer_id}"))
        );

        Ok(())
    }

    #[tokio::test]
    async fn test_ledger_failure_returns_503() -> TestResult {
        let mut app = MockApp::default();

        app.ledger.checkpoint();
        app.ledger
            .expect_list_documents()
            .once()
            .return_once(|| Err(LedgerServiceError::AlreadyExists));

        let res = TestClient::get("http://example.com/admin/taper/signed")
            .send(&make_service(app))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::SERVICE_UNAVAILABLE));

        Ok(())
    }
}
