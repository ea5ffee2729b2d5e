//! Signature image background removal.

use std::io::Cursor;

use image::{DynamicImage, ImageOutputFormat, Rgba};

use crate::domain::signatures::errors::SignatureImageError;

/// Mean luminance above which a pixel may count as paper.
pub const BACKGROUND_LUMA_THRESHOLD: u8 = 240;

/// Every channel must also exceed this for a pixel to count as paper.
pub const BACKGROUND_CHANNEL_THRESHOLD: u8 = 235;

/// Convert a scanned signature to grayscale and make the light paper background transparent.
///
/// Accepts any format the `image` crate was built with (PNG, JPEG, WebP) and always returns
/// PNG bytes with the original dimensions.
///
/// # Errors
///
/// Returns [`SignatureImageError::Decode`] when the bytes are not a supported image.
pub fn process_signature_image(bytes: &[u8]) -> Result<Vec<u8>, SignatureImageError> {
    let mut pixels = image::load_from_memory(bytes)
        .map_err(SignatureImageError::Decode)?
        .to_rgba8();

    for pixel in pixels.pixels_mut() {
        *pixel = clean_pixel(*pixel);
    }

    let mut encoded = Cursor::new(Vec::new());

    DynamicImage::ImageRgba8(pixels)
        .write_to(&mut encoded, ImageOutputFormat::Png)
        .map_err(SignatureImageError::Encode)?;

    Ok(encoded.into_inner())
}

fn clean_pixel(Rgba([r, g, b, a]): Rgba<u8>) -> Rgba<u8> {
    let gray = luma(r, g, b);

    let is_background = gray > BACKGROUND_LUMA_THRESHOLD
        && r > BACKGROUND_CHANNEL_THRESHOLD
        && g > BACKGROUND_CHANNEL_THRESHOLD
        && b > BACKGROUND_CHANNEL_THRESHOLD;

    Rgba([gray, gray, gray, if is_background { 0 } else { a }])
}

fn luma(r: u8, g: u8, b: u8) -> u8 {
    let sum = u16::from(r) + u16::from(g) + u16::from(b);

    u8::try_from(sum / 3).unwrap_or(u8::MAX)
}
