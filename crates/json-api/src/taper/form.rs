//! Multipart part selection for `/taper/sign`.

use salvo::http::form::{FilePart, FormData};

const PDF_FIELDS: [&str; 2] = ["pdf", "document"];
const SIGNATURE_FIELDS: [&str; 2] = ["signature", "sign"];
const SIGNATURE_EXTENSIONS: [&str; 4] = [".png", ".jpg", ".jpeg", ".webp"];

/// The two file parts a signing request needs.
#[derive(Debug)]
pub(super) struct SignParts<'a> {
    pub(super) pdf: Option<&'a FilePart>,
    pub(super) signature: Option<&'a FilePart>,
}

/// Pick the PDF and signature parts out of `form`.
///
/// Named fields win; otherwise the PDF is the first `.pdf` upload and the signature the first
/// image upload that is not the chosen PDF.
pub(super) fn select_parts(form: &FormData) -> SignParts<'_> {
    let mut files: Vec<(&str, &FilePart)> = form
        .files
        .iter()
        .map(|(field, part)| (field.as_str(), part))
        .collect();

    files.sort_by(|left, right| left.0.cmp(right.0));

    let candidates: Vec<_> = files
        .iter()
        .map(|(field, part)| (*field, part.name()))
        .collect();

    let (pdf, signature) = select_indices(&candidates);

    SignParts {
        pdf: pdf.and_then(|index| files.get(index)).map(|(_, part)| *part),
        signature: signature
            .and_then(|index| files.get(index))
            .map(|(_, part)| *part),
    }
}

/// `(field name, client filename)` pairs to `(pdf index, signature index)`.
fn select_indices(parts: &[(&str, Option<&str>)]) -> (Option<usize>, Option<usize>) {
    let by_field = |names: &[&str]| {
        parts
            .iter()
            .position(|(field, _)| names.iter().any(|name| field.eq_ignore_ascii_case(name)))
    };

    let pdf = by_field(&PDF_FIELDS).or_else(|| {
        parts
            .iter()
            .position(|(_, filename)| has_extension(*filename, &[".pdf"]))
    });

    let signature = by_field(&SIGNATURE_FIELDS)
        .filter(|index| Some(*index) != pdf)
        .or_else(|| {
            parts
                .iter()
                .enumerate()
                .find(|(index, (_, filename))| {
                    Some(*index) != pdf && has_extension(*filename, &SIGNATURE_EXTENSIONS)
                })
                .map(|(index, _)| index)
        });

    (pdf, signature)
}

fn has_extension(filename: Option<&str>, extensions: &[&str]) -> bool {
    filename.is_some_and(|filename| {
        let filename = filename.to_ascii_lowercase();

        extensions.iter().any(|extension| filename.ends_with(extension))
    })
}

/// `1`, `true`, `yes` or `y`, case-insensitively.
pub(super) fn parse_flag(value: Option<&str>) -> bool {
    value.is_some_and(|value| {
        matches!(
            value.trim().to_ascii_lowercase().as_str(),
            "1" | "true" | "yes" | "y"
        )
    })
}
