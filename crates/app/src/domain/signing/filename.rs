//! Output naming for signed documents.

/// Base name used when the upload has no usable filename.
pub const DEFAULT_BASE_NAME: &str = "signed-agreement";

const SIGNED_SUFFIX: &str = "-signed";
const PREVIEW_PREFIX: &str = "preview-";

/// Derive `<stem>-signed` from a client filename.
///
/// Directory components and the extension are dropped, and anything outside a conservative
/// character set is replaced so the result is safe inside a quoted `Content-Disposition`
/// parameter and as a file name on disk.
#[must_use]
pub fn signed_base_name(client_filename: Option<&str>) -> String {
    let stem = client_filename
        .and_then(|name| name.rsplit(['/', '\\']).next())
        .map(|name| name.rsplit_once('.').map_or(name, |(stem, _extension)| stem))
        .map(sanitise)
        .filter(|stem| !stem.is_empty())
        .unwrap_or_else(|| DEFAULT_BASE_NAME.to_string());

    format!("{stem}{SIGNED_SUFFIX}")
}

/// Filename shown to the client.
#[must_use]
pub fn download_filename(base_name: &str, preview_only: bool) -> String {
    if preview_only {
        format!("{PREVIEW_PREFIX}{base_name}.pdf")
    } else {
        format!("{base_name}.pdf")
    }
}

fn sanitise(stem: &str) -> String {
    let cleaned: String = stem
        .trim()
        .chars()
        .map(|ch| {
            if ch.is_alphanumeric() || matches!(ch, '-' | '_' | '.' | ' ') {
                ch
            } else {
                '_'
            }
        })
        .collect();

    cleaned.trim_matches(['.', ' ']).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_name_comes_from_client_stem() {
        assert_eq!(signed_base_name(Some("Contract-001.pdf")), "Contract-001-signed");
    }

    #[test]
    fn directories_and_extension_are_dropped() {
        assert_eq!(
            signed_base_name(Some(r"C:\Users\me\offer.final.PDF")),
            "offer.final-signed"
        );
        assert_eq!(signed_base_name(Some("/tmp/x/agreement")), "agreement-signed");
    }

    #[test]
    fn unsafe_characters_are_replaced() {
        assert_eq!(
            signed_base_name(Some("a\"b;\r\nc.pdf")),
            "a_b___c-signed"
        );
    }

    #[test]
    fn missing_or_empty_names_use_default() {
        for name in [None, Some(""), Some(".pdf"), Some("..."), Some("dir/")] {
            assert_eq!(
                signed_base_name(name),
                "signed-agreement-signed",
                "unexpected base for {name:?}"
            );
        }
    }

    #[test]
    fn preview_filename_is_prefixed() {
        assert_eq!(download_filename("x-signed", true), "preview-x-signed.pdf");
        assert_eq!(download_filename("x-signed", false), "x-signed.pdf");
    }
}
