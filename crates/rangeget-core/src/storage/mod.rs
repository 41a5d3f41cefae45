//! Part files and their lifecycle.
//!
//! Each range is written to `<output>.part<index>` by exactly one worker,
//! merged in index order into `<output>`, then removed.

mod cleanup;
mod merge;
mod writer;

pub use cleanup::remove_parts;
pub use merge::merge_parts;
pub use writer::PartWriter;

use std::path::{Path, PathBuf};

/// Suffix of part files, followed by the zero-based part index.
pub const PART_SUFFIX: &str = ".part";

/// Path of part `index` for `output` (e.g. `file.iso` → `file.iso.part3`).
/// Merge and cleanup locate parts by this name alone.
pub fn part_path(output: &Path, index: usize) -> PathBuf {
    let mut o = output.as_os_str().to_owned();
    o.push(format!("{}{}", PART_SUFFIX, index));
    PathBuf::from(o)
}
