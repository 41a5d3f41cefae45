//! Range fetching and the bounded, fail-fast download pool.
//!
//! `RangeFetcher` fetches one byte range into a sink; `download_ranges` runs
//! one fetch per planned range on a scoped pool of exactly as many worker
//! threads, writing each range to its own part file.

mod run;
mod segment;

pub use run::download_ranges;

use crate::error::FetchError;
use crate::segmenter::ByteRange;
use std::io::Write;
use std::sync::atomic::{AtomicBool, AtomicU64};

/// Fetches a single byte range of `url` into `sink`.
///
/// `progress` is advanced by every byte written (observability only). Once
/// `abort` is set, implementations should stop at the next opportunity and
/// return `FetchError::Aborted`.
pub trait RangeFetcher {
    fn fetch_range(
        &self,
        url: &str,
        range: &ByteRange,
        sink: &mut dyn Write,
        progress: &AtomicU64,
        abort: &AtomicBool,
    ) -> Result<u64, FetchError>;
}
