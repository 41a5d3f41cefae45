//! Ordered concatenation of part files into the output.

use std::fs::File;
use std::io::{self, ErrorKind, Read, Write};
use std::path::Path;

use super::part_path;
use crate::error::DownloadError;
use crate::segmenter::ByteRange;

fn io_err(path: &Path) -> impl FnOnce(io::Error) -> DownloadError {
    let path = path.to_path_buf();
    move |source| DownloadError::Merge { path, source }
}

/// Appends every part in ascending range index to `output`, streaming
/// through one `buffer_bytes` buffer. Each part must be exactly as long as
/// its range. Returns the number of bytes written.
///
/// On error the output is left partial and the parts stay on disk.
pub fn merge_parts(output: &Path, ranges: &[ByteRange], buffer_bytes: usize) -> Result<u64, DownloadError> {
    let mut ordered: Vec<&ByteRange> = ranges.iter().collect();
    ordered.sort_by_key(|r| r.index);

    let mut out = File::create(output).map_err(io_err(output))?;
    let mut buf = vec![0u8; buffer_bytes.max(1)];
    let mut total = 0u64;

    for range in ordered {
        let path = part_path(output, range.index);
        let mut part = File::open(&path).map_err(io_err(&path))?;
        let mut copied = 0u64;
        loop {
            let n = match part.read(&mut buf) {
                Ok(0) => break,
                Ok(n) => n,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(io_err(&path)(e)),
            };
            out.write_all(&buf[..n]).map_err(io_err(output))?;
            copied += n as u64;
        }
        if copied != range.len() {
            return Err(DownloadError::MergeLength {
                path,
                expected: range.len(),
                actual: copied,
            });
        }
        tracing::debug!(part = range.index, bytes = copied, "part merged");
        total += copied;
    }

    out.sync_all().map_err(io_err(output))?;

    let expected: u64 = ranges.iter().map(ByteRange::len).sum();
    if total != expected {
        return Err(DownloadError::MergeLength {
            path: output.to_path_buf(),
            expected,
            actual: total,
        });
    }
    Ok(total)
}
