//! Resource size probing.
//!
//! Issues `GET` with `Range: bytes=0-0` (some origins reject `HEAD`) and
//! resolves the total size from `Content-Range`, falling back to
//! `Content-Length`.

mod parse;

pub use parse::{parse_probe_headers, ProbeHeaders};
pub(crate) use parse::status_code;

use crate::client::CurlClient;
use crate::error::{DownloadError, Stage};
use std::str;

/// Body bytes the probe accepts before cutting the transfer. A 206 answer has
/// one byte; anything longer means the origin ignored the range.
const PROBE_BODY_LIMIT: usize = 64;

/// Outcome of probing a resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeResult {
    pub total_size: u64,
    /// True when the origin answered 206 or sent a usable Content-Range.
    pub supports_ranges: bool,
    /// `Content-Disposition` value if present (filename hint).
    pub content_disposition: Option<String>,
}

/// Determines the total length of a resource before any range is fetched.
pub trait SizeProber {
    fn probe(&self, url: &str) -> Result<ProbeResult, DownloadError>;
}

fn transport(source: curl::Error) -> DownloadError {
    DownloadError::Transport {
        stage: Stage::Probe,
        source,
    }
}

impl SizeProber for CurlClient {
    fn probe(&self, url: &str) -> Result<ProbeResult, DownloadError> {
        let mut lines: Vec<String> = Vec::new();
        let mut body_len = 0usize;
        let mut cut_short = false;

        let mut easy = self.easy(url).map_err(transport)?;
        easy.range("0-0").map_err(transport)?;
        if let Some(t) = self.options().fetch_timeout {
            easy.timeout(t).map_err(transport)?;
        }

        let perform_result = {
            let mut transfer = easy.transfer();
            transfer
                .header_function(|data| {
                    if let Ok(s) = str::from_utf8(data) {
                        let line = s.trim_end();
                        // A new status line starts the headers of the next hop in a redirect chain.
                        if status_code(line).is_some() {
                            lines.clear();
                        }
                        lines.push(line.to_string());
                    }
                    true
                })
                .map_err(transport)?;
            transfer
                .write_function(|data| {
                    body_len += data.len();
                    if body_len > PROBE_BODY_LIMIT {
                        cut_short = true;
                        return Ok(0);
                    }
                    Ok(data.len())
                })
                .map_err(transport)?;
            transfer.perform()
        };

        if let Err(e) = perform_result {
            if !(e.is_write_error() && cut_short) {
                return Err(transport(e));
            }
            tracing::debug!(url, "probe body exceeded {} bytes; origin ignored the range", PROBE_BODY_LIMIT);
        }

        let code = easy.response_code().map_err(transport)?;
        if !(200..300).contains(&code) {
            return Err(DownloadError::HttpStatus {
                stage: Stage::Probe,
                code,
            });
        }

        let headers = parse_probe_headers(&lines);
        let total_size = headers.total_size().ok_or(DownloadError::SizeUnknown)?;
        let supports_ranges = code == 206 || headers.content_range_total.is_some();
        tracing::debug!(url, code, total_size, supports_ranges, "probe complete");

        Ok(ProbeResult {
            total_size,
            supports_ranges,
            content_disposition: headers.content_disposition,
        })
    }
}
