//! Signature image cleanup and PDF stamping.

pub mod errors;
pub mod overlay;
pub mod placement;
pub mod processing;

pub use errors::{OverlayError, SignatureImageError};
pub use overlay::overlay_signature;
pub use placement::SignaturePlacement;
pub use processing::process_signature_image;
