//! Signing service.

use std::{fmt, sync::Arc};

use async_trait::async_trait;
use jiff::Timestamp;
use mockall::automock;
use tokio::task;
use tracing::{debug, info, warn};

use crate::{
    domain::{
        ledger::{
            LedgerService,
            data::NewSignedDocument,
            records::{SignedDocumentRecord, SignedDocumentUuid},
        },
        otps::OtpsService,
        signatures::{overlay_signature, process_signature_image},
        signing::{
            data::{Disposition, SignRequest, SignedPdf},
            errors::SigningServiceError,
            filename::{download_filename, signed_base_name},
        },
        tokens::{IssuedSigningToken, SigningGrant, SigningTokens},
    },
    storage::{DocumentStorage, SIGNED_DOCUMENTS_DIR},
};

#[derive(Clone)]
pub struct TaperSigningService {
    otps: Arc<dyn OtpsService>,
    ledger: Arc<dyn LedgerService>,
    storage: Arc<dyn DocumentStorage>,
    tokens: SigningTokens,
    single_use_otp: bool,
}

impl TaperSigningService {
    #[must_use]
    pub fn new(
        otps: Arc<dyn OtpsService>,
        ledger: Arc<dyn LedgerService>,
        storage: Arc<dyn DocumentStorage>,
        tokens: SigningTokens,
    ) -> Self {
        Self {
            otps,
            ledger,
            storage,
            tokens,
            single_use_otp: false,
        }
    }

    /// Burn the OTP on its first stored signing, after which neither the OTP nor tokens
    /// issued for it are accepted.
    #[must_use]
    pub fn with_single_use_otp(mut self, single_use_otp: bool) -> Self {
        self.single_use_otp = single_use_otp;
        self
    }

    async fn archive(
        &self,
        grant: &SigningGrant,
        base_name: &str,
        filename: &str,
        bytes: &[u8],
        now: Timestamp,
    ) -> Result<SignedDocumentRecord, SigningServiceError> {
        let label = self
            .otps
            .find_otp(&grant.code)
            .await?
            .map(|otp| otp.label)
            .unwrap_or_default();

        let uuid = SignedDocumentUuid::new();
        let stored_path = format!("{SIGNED_DOCUMENTS_DIR}/{uuid}-{base_name}.pdf");

        self.storage.store(&stored_path, bytes).await?;

        let recorded = self
            .ledger
            .record(
                NewSignedDocument {
                    uuid,
                    otp_code: grant.code.clone(),
                    label,
                    filename: filename.to_string(),
                    stored_path: stored_path.clone(),
                },
                now,
            )
            .await;

        match recorded {
            Ok(document) => Ok(document),
            Err(error) => {
                if let Err(source) = self.storage.remove(&stored_path).await {
                    warn!(stored_path, "failed to remove unrecorded signed pdf: {source}");
                }

                Err(error.into())
            }
        }
    }

    /// Hand back an OTP consumed by a signing that then failed to archive.
    async fn release(&self, grant: &SigningGrant, consumed_at: Timestamp) {
        match self.otps.release_otp(&grant.code, consumed_at).await {
            Ok(true) => debug!("released otp after failed archive"),
            Ok(false) => warn!("otp consumption changed before it could be released"),
            Err(source) => warn!("failed to release otp after failed archive: {source}"),
        }
    }
}

impl fmt::Debug for TaperSigningService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TaperSigningService")
            .field("tokens", &self.tokens)
            .field("single_use_otp", &self.single_use_otp)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl SigningService for TaperSigningService {
    async fn exchange_otp(
        &self,
        otp: &str,
        now: Timestamp,
    ) -> Result<IssuedSigningToken, SigningServiceError> {
        let code = otp.trim();

        if code.is_empty() {
            return Err(SigningServiceError::MissingOtp);
        }

        let Some(otp) = self.otps.verify_otp(code, now).await? else {
            warn!(otp_len = code.len(), "otp verification failed (invalid or expired)");

            return Err(SigningServiceError::InvalidOtp);
        };

        self.tokens
            .issue(&otp.code, now)
            .map_err(SigningServiceError::Token)
    }

    async fn authorize(&self, token: &str, now: Timestamp) -> Result<SigningGrant, SigningServiceError> {
        let grant = self
            .tokens
            .verify(token, now)
            .map_err(|source| SigningServiceError::Unauthorized(Some(source)))?;

        if self.single_use_otp
            && let Some(otp) = self.otps.find_otp(&grant.code).await?
            && otp.consumed_at.is_some()
        {
            debug!("signing token presented for a consumed otp");

            return Err(SigningServiceError::Unauthorized(None));
        }

        Ok(grant)
    }

    async fn sign(
        &self,
        grant: &SigningGrant,
        request: SignRequest,
        now: Timestamp,
    ) -> Result<SignedPdf, SigningServiceError> {
        let SignRequest {
            pdf,
            pdf_filename,
            signature,
            placement,
            preview_only,
        } = request;

        let bytes = task::spawn_blocking(move || -> Result<Vec<u8>, SigningServiceError> {
            let signature = process_signature_image(&signature)?;

            Ok(overlay_signature(&pdf, &signature, placement)?)
        })
        .await
        .map_err(SigningServiceError::Task)??;

        let base_name = signed_base_name(pdf_filename.as_deref());
        let filename = download_filename(&base_name, preview_only);

        if preview_only {
            debug!(filename, "rendered signing preview");

            return Ok(SignedPdf {
                bytes,
                filename,
                disposition: Disposition::Inline,
                document: None,
            });
        }

        if self.single_use_otp && !self.otps.consume_otp(&grant.code, now).await? {
            return Err(SigningServiceError::Unauthorized(None));
        }

        let document = match self.archive(grant, &base_name, &filename, &bytes, now).await {
            Ok(document) => document,
            Err(error) => {
                if self.single_use_otp {
                    self.release(grant, now).await;
                }

                return Err(error);
            }
        };

        info!(document = %document.uuid, filename, "signed document recorded");

        Ok(SignedPdf {
            bytes,
            filename,
            disposition: Disposition::Attachment,
            document: Some(document),
        })
    }
}

#[automock]
#[async_trait]
pub trait SigningService: Send + Sync {
    /// Trade a valid OTP for a signing token.
    async fn exchange_otp(
        &self,
        otp: &str,
        now: Timestamp,
    ) -> Result<IssuedSigningToken, SigningServiceError>;

    /// Check a bearer token and return what it authorises.
    async fn authorize(&self, token: &str, now: Timestamp) -> Result<SigningGrant, SigningServiceError>;

    /// Stamp the signature onto the PDF and, unless previewing, archive and record the result.
    async fn sign(
        &self,
        grant: &SigningGrant,
        request: SignRequest,
        now: Timestamp,
    ) -> Result<SignedPdf, SigningServiceError>;
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use jiff::SignedDuration;
    use testresult::TestResult;

    use crate::{
        domain::{
            ledger::{InMemoryLedgerService, LedgerServiceError, MockLedgerService},
            otps::InMemoryOtpsService,
            signatures::SignaturePlacement,
            tokens::{SIGNING_TOKEN_TTL, SigningTokenSecret},
        },
        fixtures::{sample_pdf, signature_png},
        storage::{FilesystemDocumentStorage, MockDocumentStorage, StorageError},
    };

    use super::*;

    struct Harness {
        otps: Arc<InMemoryOtpsService>,
        ledger: Arc<InMemoryLedgerService>,
        signing: TaperSigningService,
        upload_dir: tempfile::TempDir,
    }

    fn start() -> Timestamp {
        Timestamp::from_second(1_700_000_000).unwrap_or(Timestamp::UNIX_EPOCH)
    }

    fn tokens() -> SigningTokens {
        SigningTokens::new(SigningTokenSecret::new("test-secret").expect("secret is not empty"))
    }

    fn harness() -> Harness {
        let upload_dir = tempfile::tempdir().expect("tempdir should be created");
        let otps = Arc::new(InMemoryOtpsService::new());
        let ledger = Arc::new(InMemoryLedgerService::new());

        let signing = TaperSigningService::new(
            otps.clone(),
            ledger.clone(),
            Arc::new(FilesystemDocumentStorage::new(upload_dir.path())),
            tokens(),
        );

        Harness {
            otps,
            ledger,
            signing,
            upload_dir,
        }
    }

    fn request(preview_only: bool) -> SignRequest {
        SignRequest {
            pdf: sample_pdf(2, [0, 0, 595, 842]).expect("sample pdf"),
            pdf_filename: Some("Contract-001.pdf".to_string()),
            signature: signature_png(120, 60).expect("sample signature"),
            placement: SignaturePlacement::default(),
            preview_only,
        }
    }

    fn file_count(dir: &Path) -> usize {
        let Ok(entries) = std::fs::read_dir(dir) else {
            return 0;
        };

        entries
            .filter_map(Result::ok)
            .map(|entry| {
                let path = entry.path();

                if path.is_dir() { file_count(&path) } else { 1 }
            })
            .sum()
    }

    async fn grant_for(harness: &Harness, label: &str) -> SigningGrant {
        let otp = harness
            .otps
            .create_otp(label, start())
            .await
            .expect("otp should be created");
        let issued = harness
            .signing
            .exchange_otp(&otp.code, start())
            .await
            .expect("otp should be exchanged");

        harness
            .signing
            .authorize(&issued.token, start())
            .await
            .expect("token should authorise")
    }

    #[tokio::test]
    async fn stored_signing_archives_and_records() -> TestResult {
        let harness = harness();
        let grant = grant_for(&harness, "Contract-001").await;

        let signed = harness.signing.sign(&grant, request(false), start()).await?;

        assert_eq!(signed.filename, "Contract-001-signed.pdf");
        assert_eq!(signed.disposition, Disposition::Attachment);
        assert!(signed.bytes.starts_with(b"%PDF"), "response is a pdf");

        let documents = harness.ledger.list_documents().await?;
        let [document] = documents.as_slice() else {
            return Err(format!("expected one ledger entry, got {}", documents.len()).into());
        };

        assert_eq!(document.label, "Contract-001");
        assert_eq!(document.otp_code, grant.code);
        assert_eq!(signed.document.as_ref(), Some(document));

        let stored = std::fs::read(harness.upload_dir.path().join(&document.stored_path))?;

        assert_eq!(stored, signed.bytes, "stored file matches the response");

        Ok(())
    }

    #[tokio::test]
    async fn preview_neither_stores_nor_records() -> TestResult {
        let harness = harness();
        let grant = grant_for(&harness, "Contract-001").await;

        let signed = harness.signing.sign(&grant, request(true), start()).await?;

        assert_eq!(signed.filename, "preview-Contract-001-signed.pdf");
        assert_eq!(signed.disposition, Disposition::Inline);
        assert!(signed.document.is_none());
        assert!(harness.ledger.list_documents().await?.is_empty());
        assert_eq!(file_count(harness.upload_dir.path()), 0);

        Ok(())
    }

    #[tokio::test]
    async fn token_is_reusable_within_its_window() -> TestResult {
        let harness = harness();
        let grant = grant_for(&harness, "repeat").await;

        harness.signing.sign(&grant, request(false), start()).await?;
        harness
            .signing
            .sign(&grant, request(false), start() + SignedDuration::from_mins(5))
            .await?;

        assert_eq!(harness.ledger.list_documents().await?.len(), 2);

        Ok(())
    }

    #[tokio::test]
    async fn empty_and_unknown_otps_are_rejected() -> TestResult {
        let harness = harness();

        let empty = harness.signing.exchange_otp("   ", start()).await;
        let unknown = harness.signing.exchange_otp("000000", start()).await;

        assert!(
            matches!(empty, Err(SigningServiceError::MissingOtp)),
            "expected MissingOtp, got {empty:?}"
        );
        assert!(
            matches!(unknown, Err(SigningServiceError::InvalidOtp)),
            "expected InvalidOtp, got {unknown:?}"
        );

        Ok(())
    }

    #[tokio::test]
    async fn otp_is_trimmed_before_verification() -> TestResult {
        let harness = harness();
        let otp = harness.otps.create_otp("", start()).await?;

        let issued = harness
            .signing
            .exchange_otp(&format!(" {} \n", otp.code), start())
            .await?;

        assert_eq!(harness.signing.authorize(&issued.token, start()).await?.code, otp.code);

        Ok(())
    }

    #[tokio::test]
    async fn expired_token_is_unauthorised() -> TestResult {
        let harness = harness();
        let otp = harness.otps.create_otp("", start()).await?;
        let issued = harness.signing.exchange_otp(&otp.code, start()).await?;

        let result = harness
            .signing
            .authorize(&issued.token, start() + SIGNING_TOKEN_TTL)
            .await;

        assert!(
            matches!(result, Err(SigningServiceError::Unauthorized(_))),
            "expected Unauthorized, got {result:?}"
        );

        Ok(())
    }

    #[tokio::test]
    async fn invalid_signature_image_stores_nothing() -> TestResult {
        let harness = harness();
        let grant = grant_for(&harness, "").await;

        let mut bad = request(false);

        bad.signature = b"not an image".to_vec();

        let result = harness.signing.sign(&grant, bad, start()).await;

        assert!(
            matches!(result, Err(SigningServiceError::InvalidSignatureImage(_))),
            "expected InvalidSignatureImage, got {result:?}"
        );
        assert!(harness.ledger.list_documents().await?.is_empty());
        assert_eq!(file_count(harness.upload_dir.path()), 0);

        Ok(())
    }

    #[tokio::test]
    async fn unreadable_pdf_is_an_overlay_failure() -> TestResult {
        let harness = harness();
        let grant = grant_for(&harness, "").await;

        let mut bad = request(false);

        bad.pdf = b"%PDF-1.7 truncated".to_vec();

        let result = harness.signing.sign(&grant, bad, start()).await;

        assert!(
            matches!(result, Err(SigningServiceError::Overlay(_))),
            "expected Overlay, got {result:?}"
        );
        assert_eq!(file_count(harness.upload_dir.path()), 0);

        Ok(())
    }

    #[tokio::test]
    async fn label_falls_back_to_empty_once_otp_is_gone() -> TestResult {
        let harness = harness();
        let otp = harness.otps.create_otp("vanishing", start()).await?;
        let late = start() + SignedDuration::from_mins(19);
        let issued = harness.signing.exchange_otp(&otp.code, late).await?;

        let after_expiry = start() + SignedDuration::from_mins(25);

        harness.otps.purge_expired(after_expiry).await?;

        let grant = harness.signing.authorize(&issued.token, after_expiry).await?;
        let signed = harness.signing.sign(&grant, request(false), after_expiry).await?;

        assert_eq!(signed.document.map(|document| document.label), Some(String::new()));

        Ok(())
    }

    #[tokio::test]
    async fn single_use_otp_is_burned_by_first_stored_signing() -> TestResult {
        let harness = harness();
        let signing = harness.signing.clone().with_single_use_otp(true);
        let otp = harness.otps.create_otp("once", start()).await?;
        let issued = signing.exchange_otp(&otp.code, start()).await?;
        let grant = signing.authorize(&issued.token, start()).await?;

        signing.sign(&grant, request(true), start()).await?;
        signing.sign(&grant, request(false), start()).await?;

        let reuse = signing.authorize(&issued.token, start()).await;
        let second_exchange = signing.exchange_otp(&otp.code, start()).await;

        assert!(
            matches!(reuse, Err(SigningServiceError::Unauthorized(None))),
            "expected Unauthorized, got {reuse:?}"
        );
        assert!(
            matches!(second_exchange, Err(SigningServiceError::InvalidOtp)),
            "expected InvalidOtp, got {second_exchange:?}"
        );
        assert_eq!(harness.ledger.list_documents().await?.len(), 1);

        Ok(())
    }

    #[tokio::test]
    async fn failed_recording_removes_stored_file() -> TestResult {
        let upload_dir = tempfile::tempdir()?;
        let otps = Arc::new(InMemoryOtpsService::new());
        let mut ledger = MockLedgerService::new();

        ledger
            .expect_record()
            .once()
            .return_once(|_, _| Err(LedgerServiceError::AlreadyExists));
        ledger.expect_list_documents().never();
        ledger.expect_get_document().never();

        let signing = TaperSigningService::new(
            otps.clone(),
            Arc::new(ledger),
            Arc::new(FilesystemDocumentStorage::new(upload_dir.path())),
            tokens(),
        );

        let otp = otps.create_otp("", start()).await?;
        let issued = signing.exchange_otp(&otp.code, start()).await?;
        let grant = signing.authorize(&issued.token, start()).await?;

        let result = signing.sign(&grant, request(false), start()).await;

        assert!(
            matches!(result, Err(SigningServiceError::Ledger(_))),
            "expected Ledger, got {result:?}"
        );
        assert_eq!(file_count(upload_dir.path()), 0, "orphaned pdf must be removed");

        Ok(())
    }

    #[tokio::test]
    async fn failed_store_hands_single_use_otp_back() -> TestResult {
        let otps = Arc::new(InMemoryOtpsService::new());
        let ledger = Arc::new(InMemoryLedgerService::new());
        let mut storage = MockDocumentStorage::new();

        storage
            .expect_store()
            .once()
            .return_once(|_, _| Err(StorageError::Io(std::io::Error::other("disk full"))));
        storage.expect_load().never();
        storage.expect_remove().never();

        let signing = TaperSigningService::new(
            otps.clone(),
            ledger.clone(),
            Arc::new(storage),
            tokens(),
        )
        .with_single_use_otp(true);

        let otp = otps.create_otp("retry", start()).await?;
        let issued = signing.exchange_otp(&otp.code, start()).await?;
        let grant = signing.authorize(&issued.token, start()).await?;

        let result = signing.sign(&grant, request(false), start()).await;

        assert!(
            matches!(result, Err(SigningServiceError::Storage(_))),
            "expected Storage, got {result:?}"
        );
        assert!(ledger.list_documents().await?.is_empty());
        assert!(
            signing.authorize(&issued.token, start()).await.is_ok(),
            "token still authorises after the failed signing"
        );
        assert!(
            signing.exchange_otp(&otp.code, start()).await.is_ok(),
            "otp can be exchanged again"
        );

        Ok(())
    }

    #[tokio::test]
    async fn failed_recording_hands_single_use_otp_back() -> TestResult {
        let upload_dir = tempfile::tempdir()?;
        let otps = Arc::new(InMemoryOtpsService::new());
        let mut ledger = MockLedgerService::new();

        ledger
            .expect_record()
            .once()
            .return_once(|_, _| Err(LedgerServiceError::AlreadyExists));
        ledger.expect_list_documents().never();
        ledger.expect_get_document().never();

        let signing = TaperSigningService::new(
            otps.clone(),
            Arc::new(ledger),
            Arc::new(FilesystemDocumentStorage::new(upload_dir.path())),
            tokens(),
        )
        .with_single_use_otp(true);

        let otp = otps.create_otp("", start()).await?;
        let issued = signing.exchange_otp(&otp.code, start()).await?;
        let grant = signing.authorize(&issued.token, start()).await?;

        let result = signing.sign(&grant, request(false), start()).await;

        assert!(
            matches!(result, Err(SigningServiceError::Ledger(_))),
            "expected Ledger, got {result:?}"
        );
        assert_eq!(file_count(upload_dir.path()), 0, "orphaned pdf must be removed");
        assert_eq!(
            otps.find_otp(&otp.code).await?.and_then(|otp| otp.consumed_at),
            None,
            "consumption is released"
        );

        Ok(())
    }

}
