//! Signed Document Records

use jiff::Timestamp;

use crate::uuids::TypedUuid;

/// Signed Document UUID
pub type SignedDocumentUuid = TypedUuid<SignedDocumentRecord>;

/// Signed Document Record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedDocumentRecord {
    pub uuid: SignedDocumentUuid,
    pub otp_code: String,
    pub label: String,
    pub filename: String,
    /// Location relative to the upload directory, e.g. `signed/<uuid>-contract-signed.pdf`.
    pub stored_path: String,
    pub created_at: Timestamp,
}
