//! Runs one download job end to end.
//!
//! Planning → Probing → Fetching → Merging → CleaningUp → Done, with
//! `Failed` reachable from probing, fetching and merging. A failed job
//! leaves its part files on disk for inspection.

mod job;

pub use job::{DownloadJob, JobState};

use std::path::PathBuf;
use std::time::{Duration, Instant};

use crate::downloader::{download_ranges, RangeFetcher};
use crate::error::{CleanupWarning, DownloadError};
use crate::probe::SizeProber;
use crate::progress::ProgressStats;
use crate::segmenter::plan_ranges;
use crate::storage::{merge_parts, remove_parts};

/// Default copy buffer for the merge stage.
pub const DEFAULT_MERGE_BUFFER_BYTES: usize = 8192;

/// Caller input for one download.
#[derive(Debug, Clone)]
pub struct DownloadRequest {
    pub url: String,
    pub output: PathBuf,
    pub workers: usize,
    pub merge_buffer_bytes: usize,
}

impl DownloadRequest {
    pub fn new(url: impl Into<String>, output: impl Into<PathBuf>, workers: usize) -> Self {
        Self {
            url: url.into(),
            output: output.into(),
            workers,
            merge_buffer_bytes: DEFAULT_MERGE_BUFFER_BYTES,
        }
    }

    pub fn with_merge_buffer(mut self, bytes: usize) -> Self {
        self.merge_buffer_bytes = bytes;
        self
    }
}

/// Summary of a completed download.
#[derive(Debug)]
pub struct DownloadReport {
    pub output: PathBuf,
    pub total_size: u64,
    /// Ranges actually fetched (worker count after clamping).
    pub part_count: usize,
    pub elapsed: Duration,
    /// Part files that could not be removed; the download still succeeded.
    pub cleanup_warnings: Vec<CleanupWarning>,
}

/// Downloads `request.url` into `request.output` using `client` for the probe
/// and every range fetch.
///
/// Returns the first fatal error. Probe failures happen before any part file
/// exists; fetch and merge failures leave the part files in place.
pub fn run_download<C>(
    client: &C,
    request: &DownloadRequest,
    progress_tx: Option<&tokio::sync::mpsc::Sender<ProgressStats>>,
) -> Result<DownloadReport, DownloadError>
where
    C: SizeProber + RangeFetcher + Sync + ?Sized,
{
    let started = Instant::now();
    let mut job = DownloadJob::new(request.url.clone(), request.output.clone(), request.workers);
    if job.workers == 0 {
        return Err(DownloadError::InvalidWorkerCount(job.workers));
    }

    enter(&mut job, JobState::Probing);
    let probe = match client.probe(&job.url) {
        Ok(p) => p,
        Err(e) => return Err(fail(&mut job, e)),
    };
    if !probe.supports_ranges && job.workers > 1 {
        tracing::warn!(url = %job.url, "origin did not confirm range support; parts will be sliced from full responses");
    }
    job.total_size = Some(probe.total_size);
    job.ranges = match plan_ranges(probe.total_size, job.workers) {
        Ok(ranges) => ranges,
        Err(e) => return Err(fail(&mut job, e)),
    };
    tracing::info!(
        total_size = probe.total_size,
        parts = job.ranges.len(),
        "planned {} range(s)",
        job.ranges.len()
    );

    enter(&mut job, JobState::Fetching);
    if let Err(e) = download_ranges(client, &job.url, &job.output, &job.ranges, progress_tx) {
        return Err(fail(&mut job, e));
    }

    enter(&mut job, JobState::Merging);
    let merged = match merge_parts(&job.output, &job.ranges, request.merge_buffer_bytes) {
        Ok(n) => n,
        Err(e) => return Err(fail(&mut job, e)),
    };

    let total_size = job.total_size.unwrap_or_default();
    if merged != total_size {
        let err = DownloadError::MergeLength {
            path: job.output.clone(),
            expected: total_size,
            actual: merged,
        };
        return Err(fail(&mut job, err));
    }

    enter(&mut job, JobState::CleaningUp);
    let cleanup_warnings = remove_parts(&job.output, job.ranges.len());

    enter(&mut job, JobState::Done);
    tracing::info!(output = %job.output.display(), bytes = merged, "download complete");

    Ok(DownloadReport {
        output: job.output,
        total_size,
        part_count: job.ranges.len(),
        elapsed: started.elapsed(),
        cleanup_warnings,
    })
}

fn enter(job: &mut DownloadJob, next: JobState) {
    let moved = job.advance(next);
    debug_assert!(moved, "pipeline attempted {} -> {}", job.state(), next);
}

fn fail(job: &mut DownloadJob, err: DownloadError) -> DownloadError {
    tracing::error!(url = %job.url, state = %job.state(), error = %err, "download failed");
    enter(job, JobState::Failed);
    err
}
