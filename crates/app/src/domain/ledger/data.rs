//! Ledger Data

use crate::domain::ledger::records::SignedDocumentUuid;

/// New Signed Document Data
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewSignedDocument {
    pub uuid: SignedDocumentUuid,
    pub otp_code: String,
    pub label: String,
    pub filename: String,
    pub stored_path: String,
}
