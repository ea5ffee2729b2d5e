//! Ledger Repository

use jiff::Timestamp;
use jiff_sqlx::Timestamp as SqlxTimestamp;
use sqlx::{FromRow, PgPool, Postgres, Row, postgres::PgRow, query_as};

use crate::domain::ledger::{
    data::NewSignedDocument,
    records::{SignedDocumentRecord, SignedDocumentUuid},
};

const RECORD_SIGNED_DOCUMENT_SQL: &str = include_str!("sql/record_signed_document.sql");
const LIST_SIGNED_DOCUMENTS_SQL: &str = include_str!("sql/list_signed_documents.sql");
const GET_SIGNED_DOCUMENT_SQL: &str = include_str!("sql/get_signed_document.sql");

#[derive(Debug, Clone)]
pub(crate) struct PgLedgerRepository {
    pool: PgPool,
}

impl PgLedgerRepository {
    #[must_use]
    pub(crate) fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub(crate) async fn record(
        &self,
        document: NewSignedDocument,
        now: Timestamp,
    ) -> Result<SignedDocumentRecord, sqlx::Error> {
        query_as::<Postgres, SignedDocumentRecord>(RECORD_SIGNED_DOCUMENT_SQL)
            .bind(document.uuid.into_uuid())
            .bind(document.otp_code)
            .bind(document.label)
            .bind(document.filename)
            .bind(document.stored_path)
            .bind(SqlxTimestamp::from(now))
            .fetch_one(&self.pool)
            .await
    }

    pub(crate) async fn list(&self) -> Result<Vec<SignedDocumentRecord>, sqlx::Error> {
        query_as::<Postgres, SignedDocumentRecord>(LIST_SIGNED_DOCUMENTS_SQL)
            .fetch_all(&self.pool)
            .await
    }

    pub(crate) async fn get(
        &self,
        uuid: SignedDocumentUuid,
    ) -> Result<Option<SignedDocumentRecord>, sqlx::Error> {
        query_as::<Postgres, SignedDocumentRecord>(GET_SIGNED_DOCUMENT_SQL)
            .bind(uuid.into_uuid())
            .fetch_optional(&self.pool)
            .await
    }
}

impl<'r> FromRow<'r, PgRow> for SignedDocumentRecord {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        Ok(Self {
            uuid: SignedDocumentUuid::from_uuid(row.try_get("uuid")?),
            otp_code: row.try_get("otp_code")?,
            label: row.try_get("label")?,
            filename: row.try_get("filename")?,
            stored_path: row.try_get("stored_path")?,
            created_at: row.try_get::<SqlxTimestamp, _>("created_at")?.to_jiff(),
        })
    }
}
