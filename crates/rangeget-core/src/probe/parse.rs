//! Parse probe response header lines.

/// Size-relevant headers of the final probe response.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProbeHeaders {
    /// Total from `Content-Range: bytes a-b/<total>`; `None` if absent or `*`.
    pub content_range_total: Option<u64>,
    pub content_length: Option<u64>,
    pub content_disposition: Option<String>,
}

impl ProbeHeaders {
    /// Content-Range total wins; Content-Length is used only when positive.
    pub fn total_size(&self) -> Option<u64> {
        self.content_range_total
            .or(self.content_length.filter(|&n| n > 0))
    }
}

/// Parse collected header lines into `ProbeHeaders`.
pub fn parse_probe_headers(lines: &[String]) -> ProbeHeaders {
    let mut out = ProbeHeaders::default();

    for line in lines {
        let line = line.trim();
        let Some((name, value)) = line.split_once(':') else {
            continue;
        };
        let name = name.trim();
        let value = value.trim();
        if name.eq_ignore_ascii_case("content-range") {
            out.content_range_total = content_range_total(value);
        } else if name.eq_ignore_ascii_case("content-length") {
            out.content_length = value.parse::<u64>().ok();
        } else if name.eq_ignore_ascii_case("content-disposition") {
            out.content_disposition = Some(value.to_string());
        }
    }

    out
}

/// `bytes 0-0/8192` → `Some(8192)`; `bytes 0-0/*` → `None`.
fn content_range_total(value: &str) -> Option<u64> {
    let (_, total) = value.rsplit_once('/')?;
    let total = total.trim();
    if total == "*" {
        return None;
    }
    total.parse::<u64>().ok()
}

/// Status code of an HTTP status line (`HTTP/1.1 206 Partial Content`), if `line` is one.
pub(crate) fn status_code(line: &str) -> Option<u32> {
    let mut parts = line.split_whitespace();
    let version = parts.next()?;
    if !version.starts_with("HTTP/") {
        return None;
    }
    parts.next()?.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn content_length_only() {
        let h = parse_probe_headers(&lines(&["HTTP/1.1 200 OK", "Content-Length: 4096"]));
        assert_eq!(h.content_range_total, None);
        assert_eq!(h.total_size(), Some(4096));
    }

    #[test]
    fn content_range_wins_over_content_length() {
        let h = parse_probe_headers(&lines(&[
            "HTTP/1.1 206 Partial Content",
            "Content-Length: 1",
            "Content-Range: bytes 0-0/8192",
        ]));
        assert_eq!(h.total_size(), Some(8192));
    }

    #[test]
    fn unknown_total_falls_back() {
        let h = parse_probe_headers(&lines(&[
            "Content-Range: bytes 0-0/*",
            "Content-Length: 1",
        ]));
        assert_eq!(h.content_range_total, None);
        assert_eq!(h.total_size(), Some(1));
    }

    #[test]
    fn nothing_usable() {
        let h = parse_probe_headers(&lines(&[
            "HTTP/1.1 200 OK",
            "Content-Range: bytes 0-0/*",
            "Content-Length: 0",
        ]));
        assert_eq!(h.total_size(), None);
    }

    #[test]
    fn header_names_are_case_insensitive() {
        let h = parse_probe_headers(&lines(&[
            "content-range: bytes 0-0/77",
            "CONTENT-DISPOSITION: attachment; filename=a.bin",
        ]));
        assert_eq!(h.content_range_total, Some(77));
        assert_eq!(h.content_disposition.as_deref(), Some("attachment; filename=a.bin"));
    }

    #[test]
    fn status_lines() {
        assert_eq!(status_code("HTTP/1.1 206 Partial Content"), Some(206));
        assert_eq!(status_code("HTTP/2 200"), Some(200));
        assert_eq!(status_code("Content-Length: 5"), None);
    }
}
