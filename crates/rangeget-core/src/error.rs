//! Error types for the download pipeline.
//!
//! `DownloadError` is what a whole job fails with; `FetchError` is the cause
//! carried by a single failed part; `CleanupWarning` is never fatal.

use std::fmt;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Pipeline stage an error came from, used for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Probe,
    Fetch,
    Merge,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Stage::Probe => "probe",
            Stage::Fetch => "fetch",
            Stage::Merge => "merge",
        };
        f.write_str(s)
    }
}

/// Fatal error for a download job.
#[derive(Debug, Error)]
pub enum DownloadError {
    /// Probe succeeded but neither Content-Range nor Content-Length gave a size.
    #[error("probe: unable to determine resource size")]
    SizeUnknown,
    /// Origin answered with a status the stage does not accept.
    #[error("{stage}: HTTP {code}")]
    HttpStatus { stage: Stage, code: u32 },
    #[error("invalid worker count {0}: must be at least 1")]
    InvalidWorkerCount(usize),
    /// First observed failure of a range fetch task.
    #[error("fetch: part {part_index} failed")]
    RangeFetch {
        part_index: usize,
        #[source]
        source: FetchError,
    },
    #[error("merge: I/O error on {}", path.display())]
    Merge {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    /// A part or the merged output does not have the planned length.
    #[error("merge: {} has {actual} bytes, expected {expected}", path.display())]
    MergeLength {
        path: PathBuf,
        expected: u64,
        actual: u64,
    },
    /// A worker thread panicked; its part has no result.
    #[error("fetch: {panicked} worker thread(s) panicked")]
    WorkerPanic { panicked: usize },
    #[error("{stage}: transport error")]
    Transport {
        stage: Stage,
        #[source]
        source: curl::Error,
    },
}

impl DownloadError {
    /// Stage the error belongs to, if it is tied to one.
    pub fn stage(&self) -> Option<Stage> {
        match self {
            DownloadError::SizeUnknown => Some(Stage::Probe),
            DownloadError::HttpStatus { stage, .. } | DownloadError::Transport { stage, .. } => {
                Some(*stage)
            }
            DownloadError::RangeFetch { .. } | DownloadError::WorkerPanic { .. } => {
                Some(Stage::Fetch)
            }
            DownloadError::Merge { .. } | DownloadError::MergeLength { .. } => Some(Stage::Merge),
            DownloadError::InvalidWorkerCount(_) => None,
        }
    }

    /// Part index for fetch failures.
    pub fn part_index(&self) -> Option<usize> {
        match self {
            DownloadError::RangeFetch { part_index, .. } => Some(*part_index),
            _ => None,
        }
    }
}

/// Cause of a single range fetch failure.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Curl reported an error (timeout, connection reset, DNS, ...).
    #[error(transparent)]
    Curl(#[from] curl::Error),
    /// Status other than 200 or 206.
    #[error("HTTP {0}")]
    Http(u32),
    /// Stream ended before the whole range arrived.
    #[error("short read: expected {expected} bytes, got {received}")]
    ShortRead { expected: u64, received: u64 },
    /// Writing the part file failed.
    #[error("storage: {0}")]
    Storage(#[from] io::Error),
    /// Stopped because another part already failed.
    #[error("aborted after another part failed")]
    Aborted,
}

/// Part file that could not be removed. Logged, never propagated as a failure.
#[derive(Debug, Error)]
#[error("could not remove {}: {source}", path.display())]
pub struct CleanupWarning {
    pub path: PathBuf,
    pub source: io::Error,
}
