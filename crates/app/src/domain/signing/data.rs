//! Signing Data

use crate::domain::{ledger::records::SignedDocumentRecord, signatures::SignaturePlacement};

/// An uploaded document and signature scan to combine.
#[derive(Debug, Clone, PartialEq)]
pub struct SignRequest {
    pub pdf: Vec<u8>,
    /// Client-side filename of the PDF, used to name the output.
    pub pdf_filename: Option<String>,
    pub signature: Vec<u8>,
    pub placement: SignaturePlacement,
    /// Render only; nothing is stored or recorded.
    pub preview_only: bool,
}

/// How the signed PDF should be presented to the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    Attachment,
    Inline,
}

impl Disposition {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Attachment => "attachment",
            Self::Inline => "inline",
        }
    }
}

/// The stamped document returned to the client.
#[derive(Debug, Clone, PartialEq)]
pub struct SignedPdf {
    pub bytes: Vec<u8>,
    pub filename: String,
    pub disposition: Disposition,
    /// Ledger entry, present only for stored (non-preview) signings.
    pub document: Option<SignedDocumentRecord>,
}
