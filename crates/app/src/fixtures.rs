//! Sample documents and signature scans for tests.

use std::{error::Error, io::Cursor};

use image::{DynamicImage, ImageOutputFormat, Rgb, RgbImage};
use lopdf::{Document, Object, Stream, dictionary};

pub type FixtureResult<T> = Result<T, Box<dyn Error + Send + Sync>>;

/// Build a PDF with `pages` pages whose media box and resources are inherited from the page
/// tree root.
///
/// # Errors
///
/// Returns an error if lopdf fails to serialise the document.
pub fn sample_pdf(pages: usize, media_box: [i64; 4]) -> FixtureResult<Vec<u8>> {
    let mut document = build_document(pages, media_box);
    let mut bytes = Vec::new();

    document.save_to(&mut bytes)?;

    Ok(bytes)
}

/// A one page PDF whose trailer declares an encryption dictionary.
///
/// # Errors
///
/// Returns an error if lopdf fails to serialise the document.
pub fn encrypted_pdf() -> FixtureResult<Vec<u8>> {
    let mut document = build_document(1, [0, 0, 595, 842]);

    let encrypt_id = document.add_object(dictionary! {
        "Filter" => "Standard",
        "V" => 1,
        "R" => 2,
        "P" => -4,
        "O" => Object::string_literal(vec![0_u8; 32]),
        "U" => Object::string_literal(vec![0_u8; 32]),
    });

    document.trailer.set("Encrypt", encrypt_id);

    let mut bytes = Vec::new();

    document.save_to(&mut bytes)?;

    Ok(bytes)
}

/// A PNG "scan": white paper with a dark horizontal stroke through the middle.
///
/// # Errors
///
/// Returns an error if PNG encoding fails.
pub fn signature_png(width: u32, height: u32) -> FixtureResult<Vec<u8>> {
    let mut scan = RgbImage::from_pixel(width, height, Rgb([255, 255, 255]));

    for x in width / 8..width - width / 8 {
        for y in height / 2..(height / 2 + (height / 10).max(1)).min(height) {
            scan.put_pixel(x, y, Rgb([24, 24, 36]));
        }
    }

    let mut bytes = Cursor::new(Vec::new());

    DynamicImage::ImageRgb8(scan).write_to(&mut bytes, ImageOutputFormat::Png)?;

    Ok(bytes.into_inner())
}

fn build_document(pages: usize, media_box: [i64; 4]) -> Document {
    let mut document = Document::with_version("1.5");
    let pages_id = document.new_object_id();

    let font_id = document.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
    });

    let resources_id = document.add_object(dictionary! {
        "Font" => dictionary! { "F1" => font_id },
    });

    let kids: Vec<Object> = (1..=pages)
        .map(|number| {
            let content = format!("BT /F1 18 Tf 72 720 Td (Agreement page {number}) Tj ET");
            let content_id = document.add_object(Stream::new(dictionary! {}, content.into_bytes()));

            document
                .add_object(dictionary! {
                    "Type" => "Page",
                    "Parent" => pages_id,
                    "Contents" => content_id,
                })
                .into()
        })
        .collect();

    let [llx, lly, urx, ury] = media_box;

    document.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Count" => i64::try_from(kids.len()).unwrap_or(i64::MAX),
            "Kids" => kids,
            "Resources" => resources_id,
            "MediaBox" => vec![llx.into(), lly.into(), urx.into(), ury.into()],
        }),
    );

    let catalog_id = document.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });

    document.trailer.set("Root", catalog_id);

    document
}
