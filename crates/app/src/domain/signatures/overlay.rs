//! Stamp a processed signature onto the last page of a PDF.
//!
//! The image is embedded as a grayscale `XObject` with a soft mask built from its alpha
//! channel. The page's existing content streams are wrapped in `q`/`Q` so whatever graphics
//! state they leave behind does not leak into the stamp, which is drawn last.

use std::io::Write;

use flate2::{Compression, write::ZlibEncoder};
use lopdf::{Dictionary, Document, Object, ObjectId, Stream, dictionary};

use crate::domain::signatures::{errors::OverlayError, placement::SignaturePlacement};

/// Page size used when neither a crop box nor a media box can be found (A4 portrait).
const FALLBACK_PAGE_BOX: PageBox = PageBox {
    llx: 0.0,
    lly: 0.0,
    width: 595.0,
    height: 842.0,
};

const XOBJECT_NAME_PREFIX: &str = "TaperSig";

/// Guards against cyclic `Parent` chains in damaged page trees.
const MAX_PAGE_TREE_DEPTH: usize = 64;

/// The visible region of a page in PDF user space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageBox {
    pub llx: f64,
    pub lly: f64,
    pub width: f64,
    pub height: f64,
}

/// Where the image lands, in PDF user space with a bottom-left origin.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StampRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl StampRect {
    /// Anchor the image's bottom-left corner at the placement point.
    ///
    /// The width is `scale` times the page width and the height keeps the image's aspect
    /// ratio.
    #[must_use]
    pub fn compute(
        page: PageBox,
        placement: SignaturePlacement,
        image_width: u32,
        image_height: u32,
    ) -> Self {
        let width = placement.scale * page.width;
        let height = width * f64::from(image_height) / f64::from(image_width.max(1));

        Self {
            x: page.llx + placement.x_ratio * page.width,
            y: page.lly + (1.0 - placement.y_ratio) * page.height,
            width,
            height,
        }
    }
}

/// Overlay `signature_png` on the last page of `pdf` and return the new document bytes.
///
/// # Errors
///
/// Fails for unparseable or encrypted documents, documents without pages, malformed page
/// objects, or an undecodable stamp image.
pub fn overlay_signature(
    pdf: &[u8],
    signature_png: &[u8],
    placement: SignaturePlacement,
) -> Result<Vec<u8>, OverlayError> {
    let mut document = Document::load_mem(pdf).map_err(OverlayError::Parse)?;

    if document.trailer.has(b"Encrypt") {
        return Err(OverlayError::Encrypted);
    }

    let page_id = document
        .get_pages()
        .values()
        .next_back()
        .copied()
        .ok_or(OverlayError::NoPages)?;

    let page = page_box(&document, page_id);

    let stamp = image::load_from_memory(signature_png)
        .map_err(OverlayError::Image)?
        .to_luma_alpha8();

    let (image_width, image_height) = stamp.dimensions();

    if image_width == 0 || image_height == 0 {
        return Err(OverlayError::EmptyImage);
    }

    let (gray, alpha): (Vec<u8>, Vec<u8>) = stamp.pixels().map(|pixel| (pixel.0[0], pixel.0[1])).unzip();

    let image_id = add_image_xobject(&mut document, image_width, image_height, &gray, &alpha)?;

    let name = attach_xobject(&mut document, page_id, image_id)?;

    let rect = StampRect::compute(page, placement, image_width, image_height);

    wrap_page_contents(&mut document, page_id, &name, rect)?;

    let mut output = Vec::with_capacity(pdf.len() + gray.len());

    document
        .save_to(&mut output)
        .map_err(|source| OverlayError::Save(source.to_string()))?;

    Ok(output)
}

/// Resolve the crop box (falling back to the media box) of a page, honouring inheritance.
#[must_use]
pub fn page_box(document: &Document, page_id: ObjectId) -> PageBox {
    [b"CropBox".as_slice(), b"MediaBox".as_slice()]
        .into_iter()
        .find_map(|key| {
            inherited_attribute(document, page_id, key).and_then(|rect| rect_to_box(document, rect))
        })
        .unwrap_or(FALLBACK_PAGE_BOX)
}

fn inherited_attribute<'a>(
    document: &'a Document,
    page_id: ObjectId,
    key: &[u8],
) -> Option<&'a Object> {
    let mut current = Some(page_id);

    for _ in 0..MAX_PAGE_TREE_DEPTH {
        let node = document.get_dictionary(current?).ok()?;

        if let Ok(value) = node.get(key) {
            return Some(value);
        }

        current = node.get(b"Parent").and_then(Object::as_reference).ok();
    }

    None
}

fn rect_to_box(document: &Document, rect: &Object) -> Option<PageBox> {
    let rect = resolve(document, rect)?;
    let [a, b, c, d] = rect.as_array().ok()?.as_slice() else {
        return None;
    };

    let (x1, y1, x2, y2) = (
        number(document, a)?,
        number(document, b)?,
        number(document, c)?,
        number(document, d)?,
    );

    let page = PageBox {
        llx: x1.min(x2),
        lly: y1.min(y2),
        width: (x2 - x1).abs(),
        height: (y2 - y1).abs(),
    };

    (page.width > 0.0 && page.height > 0.0).then_some(page)
}

fn resolve<'a>(document: &'a Document, object: &'a Object) -> Option<&'a Object> {
    match object {
        Object::Reference(id) => document.get_object(*id).ok(),
        other => Some(other),
    }
}

/// Page-box coordinate as `f64`. Integers outside the `i32` range are not plausible
/// coordinates and are treated as missing.
fn number(document: &Document, object: &Object) -> Option<f64> {
    match resolve(document, object)? {
        Object::Integer(value) => i32::try_from(*value).ok().map(f64::from),
        Object::Real(value) => Some(f64::from(*value)),
        _ => None,
    }
}

fn add_image_xobject(
    document: &mut Document,
    width: u32,
    height: u32,
    gray: &[u8],
    alpha: &[u8],
) -> Result<ObjectId, OverlayError> {
    let smask_id = document.add_object(Stream::new(
        image_dictionary(width, height),
        deflate(alpha)?,
    ));

    let mut image = image_dictionary(width, height);

    image.set("SMask", smask_id);

    Ok(document.add_object(Stream::new(image, deflate(gray)?)))
}

fn image_dictionary(width: u32, height: u32) -> Dictionary {
    dictionary! {
        "Type" => "XObject",
        "Subtype" => "Image",
        "Width" => i64::from(width),
        "Height" => i64::from(height),
        "ColorSpace" => "DeviceGray",
        "BitsPerComponent" => 8,
        "Filter" => "FlateDecode",
    }
}

fn deflate(bytes: &[u8]) -> Result<Vec<u8>, OverlayError> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());

    encoder.write_all(bytes).map_err(OverlayError::Compress)?;

    encoder.finish().map_err(OverlayError::Compress)
}

/// Register `image_id` in the page's own `/XObject` resources and return its name.
///
/// Inherited or shared resource dictionaries are copied onto the page first so other pages
/// keep their resources untouched.
fn attach_xobject(
    document: &mut Document,
    page_id: ObjectId,
    image_id: ObjectId,
) -> Result<Vec<u8>, OverlayError> {
    let mut resources = match inherited_attribute(document, page_id, b"Resources") {
        Some(resources) => resolve(document, resources)
            .and_then(|resources| resources.as_dict().ok())
            .cloned()
            .ok_or(OverlayError::Malformed("resources are not a dictionary"))?,
        None => Dictionary::new(),
    };

    let mut xobjects = match resources.get(b"XObject") {
        Ok(xobjects) => resolve(document, xobjects)
            .and_then(|xobjects| xobjects.as_dict().ok())
            .cloned()
            .ok_or(OverlayError::Malformed("xobject resources are not a dictionary"))?,
        Err(_missing) => Dictionary::new(),
    };

    let name = unique_xobject_name(&xobjects);

    xobjects.set(name.clone(), image_id);
    resources.set("XObject", xobjects);

    document
        .get_object_mut(page_id)
        .and_then(Object::as_dict_mut)
        .map_err(|_ignored| OverlayError::Malformed("page is not a dictionary"))?
        .set("Resources", resources);

    Ok(name)
}

fn unique_xobject_name(xobjects: &Dictionary) -> Vec<u8> {
    let mut index = 0_u32;

    loop {
        let name = format!("{XOBJECT_NAME_PREFIX}{index}").into_bytes();

        if !xobjects.has(&name) {
            return name;
        }

        index = index.saturating_add(1);
    }
}

/// Replace the page's content with `[q, ...existing, Q + stamp]`.
fn wrap_page_contents(
    document: &mut Document,
    page_id: ObjectId,
    name: &[u8],
    rect: StampRect,
) -> Result<(), OverlayError> {
    let existing = existing_content_refs(document, page_id)?;

    let prefix_id = document.add_object(Stream::new(Dictionary::new(), b"q\n".to_vec()));

    let stamp = format!(
        "\nQ\nq {:.3} 0 0 {:.3} {:.3} {:.3} cm /{} Do Q\n",
        rect.width,
        rect.height,
        rect.x,
        rect.y,
        String::from_utf8_lossy(name)
    );

    let suffix_id = document.add_object(Stream::new(Dictionary::new(), stamp.into_bytes()));

    let mut contents = Vec::with_capacity(existing.len() + 2);

    contents.push(Object::Reference(prefix_id));
    contents.extend(existing);
    contents.push(Object::Reference(suffix_id));

    document
        .get_object_mut(page_id)
        .and_then(Object::as_dict_mut)
        .map_err(|_ignored| OverlayError::Malformed("page is not a dictionary"))?
        .set("Contents", Object::Array(contents));

    Ok(())
}

fn existing_content_refs(document: &Document, page_id: ObjectId) -> Result<Vec<Object>, OverlayError> {
    let page = document
        .get_dictionary(page_id)
        .map_err(|_ignored| OverlayError::Malformed("page is not a dictionary"))?;

    let Ok(contents) = page.get(b"Contents") else {
        return Ok(Vec::new());
    };

    match contents {
        Object::Reference(id) => match document.get_object(*id) {
            Ok(Object::Array(items)) => Ok(items.clone()),
            Ok(Object::Stream(_)) => Ok(vec![Object::Reference(*id)]),
            _ => Err(OverlayError::Malformed("page contents are not a stream")),
        },
        Object::Array(items) => Ok(items.clone()),
        _ => Err(OverlayError::Malformed("page contents are not a stream")),
    }
}
