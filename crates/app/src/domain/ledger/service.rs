//! Ledger service.

use async_trait::async_trait;
use jiff::Timestamp;
use mockall::automock;
use sqlx::PgPool;

use crate::domain::ledger::{
    data::NewSignedDocument,
    errors::LedgerServiceError,
    records::{SignedDocumentRecord, SignedDocumentUuid},
    repository::PgLedgerRepository,
};

#[derive(Debug, Clone)]
pub struct PgLedgerService {
    repository: PgLedgerRepository,
}

impl PgLedgerService {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self {
            repository: PgLedgerRepository::new(pool),
        }
    }
}

#[async_trait]
impl LedgerService for PgLedgerService {
    async fn record(
        &self,
        document: NewSignedDocument,
        now: Timestamp,
    ) -> Result<SignedDocumentRecord, LedgerServiceError> {
        Ok(self.repository.record(document, now).await?)
    }

    async fn list_documents(&self) -> Result<Vec<SignedDocumentRecord>, LedgerServiceError> {
        Ok(self.repository.list().await?)
    }

    async fn get_document(
        &self,
        uuid: SignedDocumentUuid,
    ) -> Result<Option<SignedDocumentRecord>, LedgerServiceError> {
        Ok(self.repository.get(uuid).await?)
    }
}

#[automock]
#[async_trait]
pub trait LedgerService: Send + Sync {
    /// Append an immutable entry stamped with `now`.
    async fn record(
        &self,
        document: NewSignedDocument,
        now: Timestamp,
    ) -> Result<SignedDocumentRecord, LedgerServiceError>;

    /// All entries, newest first.
    async fn list_documents(&self) -> Result<Vec<SignedDocumentRecord>, LedgerServiceError>;

    /// A single entry by identifier.
    async fn get_document(
        &self,
        uuid: SignedDocumentUuid,
    ) -> Result<Option<SignedDocumentRecord>, LedgerServiceError>;
}
