//! Single-range HTTP GET into a part sink.

use super::RangeFetcher;
use crate::client::CurlClient;
use crate::error::FetchError;
use crate::probe::status_code;
use crate::segmenter::ByteRange;
use std::cell::Cell;
use std::io::{self, Write};
use std::str;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

/// Why the write callback stopped the transfer early.
enum Halt {
    /// Whole range written; the origin kept sending (full-body 200).
    Complete,
    Rejected,
    Aborted,
    Storage(io::Error),
}

impl RangeFetcher for CurlClient {
    /// GET with `Range: bytes=start-end`. On 206 the body is the range. On 200
    /// the body is the whole resource, so the first `start` bytes are skipped
    /// and only the range is kept. Fewer bytes than the range length is a
    /// `ShortRead`.
    fn fetch_range(
        &self,
        url: &str,
        range: &ByteRange,
        sink: &mut dyn Write,
        progress: &AtomicU64,
        abort: &AtomicBool,
    ) -> Result<u64, FetchError> {
        let opts = self.options();
        let expected = range.len();
        let status = Cell::new(0u32);
        let mut skip: Option<u64> = None;
        let mut written = 0u64;
        let mut halt: Option<Halt> = None;

        let mut easy = self.easy(url)?;
        easy.range(&range.curl_range())?;
        easy.buffer_size(opts.buffer_size)?;
        easy.low_speed_limit(opts.low_speed_limit)?;
        easy.low_speed_time(opts.low_speed_time)?;
        if let Some(t) = opts.fetch_timeout {
            easy.timeout(t)?;
        }

        let perform_result = {
            let mut transfer = easy.transfer();
            transfer.header_function(|data| {
                if let Some(code) = str::from_utf8(data).ok().and_then(status_code) {
                    status.set(code);
                }
                true
            })?;
            transfer.write_function(|data| {
                if abort.load(Ordering::Relaxed) {
                    halt = Some(Halt::Aborted);
                    return Ok(0);
                }
                let code = status.get();
                if code != 200 && code != 206 {
                    halt = Some(Halt::Rejected);
                    return Ok(0);
                }

                let to_skip = skip.get_or_insert(if code == 200 { range.start } else { 0 });
                let mut chunk = data;
                if *to_skip > 0 {
                    let n = (*to_skip).min(chunk.len() as u64) as usize;
                    *to_skip -= n as u64;
                    chunk = &chunk[n..];
                }

                let take = (expected - written).min(chunk.len() as u64) as usize;
                if take > 0 {
                    if let Err(e) = sink.write_all(&chunk[..take]) {
                        halt = Some(Halt::Storage(e));
                        return Ok(0);
                    }
                    written += take as u64;
                    progress.fetch_add(take as u64, Ordering::Relaxed);
                }
                if take < chunk.len() {
                    halt = Some(Halt::Complete);
                    return Ok(0);
                }
                Ok(data.len())
            })?;
            transfer.perform()
        };

        if let Err(e) = perform_result {
            match halt {
                Some(Halt::Complete) if e.is_write_error() => {}
                Some(Halt::Rejected) if e.is_write_error() => {
                    return Err(FetchError::Http(status.get()));
                }
                Some(Halt::Aborted) if e.is_write_error() => return Err(FetchError::Aborted),
                Some(Halt::Storage(io_err)) if e.is_write_error() => {
                    return Err(FetchError::Storage(io_err));
                }
                _ => return Err(FetchError::Curl(e)),
            }
        }

        let code = easy.response_code()?;
        if code != 200 && code != 206 {
            return Err(FetchError::Http(code));
        }
        if written < expected {
            return Err(FetchError::ShortRead {
                expected,
                received: written,
            });
        }

        tracing::debug!(part = range.index, bytes = written, code, "range fetched");
        Ok(written)
    }
}
