use percent_encoding::percent_decode_str;

/// Last non-empty path segment of `url`, percent-decoded where it is valid UTF-8.
///
/// Returns `None` if the URL cannot be parsed or has no path segment.
pub fn filename_from_url_path(url: &str) -> Option<String> {
    let parsed = url::Url::parse(url).ok()?;
    let segment = parsed.path_segments()?.filter(|s| !s.is_empty()).last()?;
    let decoded = percent_decode_str(segment)
        .decode_utf8()
        .map(|s| s.into_owned())
        .unwrap_or_else(|_| segment.to_string());
    if decoded == "." || decoded == ".." {
        return None;
    }
    Some(decoded)
}
