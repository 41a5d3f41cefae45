//! Output filename derivation for when the caller gives no output path.

mod path;
mod sanitize;

pub use path::filename_from_url_path;
pub use sanitize::sanitize_filename;

/// Used when neither the response nor the URL yields a usable name.
pub const DEFAULT_FILENAME: &str = "download.bin";

/// Picks a local filename: `filename=` from `content_disposition` first,
/// then the last URL path segment, sanitized; `download.bin` otherwise.
pub fn derive_filename(url: &str, content_disposition: Option<&str>) -> String {
    content_disposition
        .and_then(disposition_filename)
        .or_else(|| filename_from_url_path(url))
        .map(|raw| sanitize_filename(&raw))
        .filter(|s| !s.is_empty() && s != "." && s != "..")
        .unwrap_or_else(|| DEFAULT_FILENAME.to_string())
}

/// `attachment; filename="a.bin"` → `a.bin`. Only the plain `filename` parameter is read.
fn disposition_filename(value: &str) -> Option<String> {
    value.split(';').find_map(|param| {
        let (name, v) = param.trim().split_once('=')?;
        if !name.trim().eq_ignore_ascii_case("filename") {
            return None;
        }
        let v = v.trim().trim_matches('"');
        (!v.is_empty()).then(|| v.to_string())
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_url_path() {
        assert_eq!(derive_filename("https://example.com/dist/tool-1.2.tar.gz", None), "tool-1.2.tar.gz");
    }

    #[test]
    fn content_disposition_wins() {
        assert_eq!(
            derive_filename(
                "https://example.com/download?id=3",
                Some("attachment; filename=\"report.pdf\"")
            ),
            "report.pdf"
        );
        assert_eq!(
            derive_filename("https://example.com/x", Some("attachment; filename=plain.bin")),
            "plain.bin"
        );
    }

    #[test]
    fn disposition_without_filename_falls_back_to_url() {
        assert_eq!(derive_filename("https://example.com/a.iso", Some("inline")), "a.iso");
    }

    #[test]
    fn fallback_name() {
        assert_eq!(derive_filename("https://example.com/", None), DEFAULT_FILENAME);
        assert_eq!(derive_filename("not a url", None), DEFAULT_FILENAME);
    }
}
