//! ByteRange type and partition planning.

use crate::error::DownloadError;

/// One contiguous byte interval `[start, end]` (inclusive) assigned to one fetch task.
/// `index` is the merge order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ByteRange {
    pub index: usize,
    pub start: u64,
    /// End offset (inclusive).
    pub end: u64,
}

impl ByteRange {
    /// Number of bytes in the range.
    pub fn len(&self) -> u64 {
        self.end - self.start + 1
    }

    /// HTTP Range header value: `bytes=start-end`.
    pub fn range_header_value(&self) -> String {
        format!("bytes={}", self.curl_range())
    }

    /// Range in the form libcurl's `CURLOPT_RANGE` expects: `start-end`.
    pub fn curl_range(&self) -> String {
        format!("{}-{}", self.start, self.end)
    }
}

/// Number of ranges actually planned: never more than one per byte.
pub fn effective_workers(total_size: u64, workers: usize) -> usize {
    if total_size < workers as u64 {
        total_size as usize
    } else {
        workers
    }
}

/// Plans `workers` ranges over `total_size` bytes.
///
/// Every range but the last has `total_size / workers` bytes; the last one
/// absorbs the remainder. When there are fewer bytes than workers the count
/// is clamped to `total_size`, so no range is ever empty. A zero-sized
/// resource yields an empty plan.
pub fn plan_ranges(total_size: u64, workers: usize) -> Result<Vec<ByteRange>, DownloadError> {
    if workers == 0 {
        return Err(DownloadError::InvalidWorkerCount(workers));
    }

    let count = effective_workers(total_size, workers);
    if count == 0 {
        return Ok(Vec::new());
    }

    let n = count as u64;
    let part_size = total_size / n;
    let ranges = (0..n)
        .map(|i| {
            let start = i * part_size;
            let end = if i == n - 1 {
                total_size - 1
            } else {
                (i + 1) * part_size - 1
            };
            ByteRange {
                index: i as usize,
                start,
                end,
            }
        })
        .collect();

    Ok(ranges)
}
