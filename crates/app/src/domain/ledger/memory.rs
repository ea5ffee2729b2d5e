//! In-process ledger.

use std::cmp::Reverse;

use async_trait::async_trait;
use jiff::Timestamp;
use tokio::sync::RwLock;

use crate::domain::ledger::{
    data::NewSignedDocument,
    errors::LedgerServiceError,
    records::{SignedDocumentRecord, SignedDocumentUuid},
    service::LedgerService,
};

#[derive(Debug, Default)]
pub struct InMemoryLedgerService {
    documents: RwLock<Vec<SignedDocumentRecord>>,
}

impl InMemoryLedgerService {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl LedgerService for InMemoryLedgerService {
    async fn record(
        &self,
        document: NewSignedDocument,
        now: Timestamp,
    ) -> Result<SignedDocumentRecord, LedgerServiceError> {
        let mut documents = self.documents.write().await;

        if documents
            .iter()
            .any(|existing| existing.uuid == document.uuid || existing.stored_path == document.stored_path)
        {
            return Err(LedgerServiceError::AlreadyExists);
        }

        let record = SignedDocumentRecord {
            uuid: document.uuid,
            otp_code: document.otp_code,
            label: document.label,
            filename: document.filename,
            stored_path: document.stored_path,
            created_at: now,
        };

        documents.push(record.clone());

        Ok(record)
    }

    async fn list_documents(&self) -> Result<Vec<SignedDocumentRecord>, LedgerServiceError> {
        let mut documents = self.documents.read().await.clone();

        documents.sort_by_key(|document| Reverse((document.created_at, document.uuid)));

        Ok(documents)
    }

    async fn get_document(
        &self,
        uuid: SignedDocumentUuid,
    ) -> Result<Option<SignedDocumentRecord>, LedgerServiceError> {
        let documents = self.documents.read().await;

        Ok(documents.iter().find(|document| document.uuid == uuid).cloned())
    }
}
