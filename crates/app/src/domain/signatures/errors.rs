//! Signature processing errors.

use std::io;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SignatureImageError {
    #[error("invalid signature image")]
    Decode(#[source] image::ImageError),

    #[error("failed to encode signature image")]
    Encode(#[source] image::ImageError),
}

#[derive(Debug, Error)]
pub enum OverlayError {
    #[error("failed to parse pdf")]
    Parse(#[source] lopdf::Error),

    #[error("pdf is encrypted")]
    Encrypted,

    #[error("pdf has no pages")]
    NoPages,

    #[error("pdf object structure is malformed: {0}")]
    Malformed(&'static str),

    #[error("failed to decode stamped image")]
    Image(#[source] image::ImageError),

    #[error("stamped image has no pixels")]
    EmptyImage,

    #[error("failed to compress image stream")]
    Compress(#[source] io::Error),

    #[error("failed to serialise pdf: {0}")]
    Save(String),
}
