//! Best-effort removal of part files.

use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use super::part_path;
use crate::error::CleanupWarning;

/// Removes `<output>.part0` .. `<output>.part<count-1>`.
///
/// A part that is already gone is not a warning. Any other failure is logged
/// and returned as a `CleanupWarning`; cleanup never fails the download.
pub fn remove_parts(output: &Path, count: usize) -> Vec<CleanupWarning> {
    let mut warnings = Vec::new();
    for index in 0..count {
        let path = part_path(output, index);
        match fs::remove_file(&path) {
            Ok(()) => tracing::debug!(path = %path.display(), "removed part"),
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(source) => {
                let warning = CleanupWarning { path, source };
                tracing::warn!("{}", warning);
                warnings.push(warning);
            }
        }
    }
    warnings
}
