//! Bounded fail-fast execution of range fetches.

use std::collections::VecDeque;
use std::path::Path;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::sync::Mutex;
use std::thread;
use std::time::{Duration, Instant};

use super::RangeFetcher;
use crate::error::{DownloadError, FetchError};
use crate::progress::ProgressStats;
use crate::segmenter::ByteRange;
use crate::storage::{part_path, PartWriter};

/// How often progress is sampled while waiting for worker results.
const PROGRESS_INTERVAL: Duration = Duration::from_millis(250);

type PartResult = Result<u64, FetchError>;

/// Fetches every range of `ranges` into `<output>.part<index>`.
///
/// Runs a scoped pool of exactly `ranges.len()` worker threads. On the first
/// failed part the abort flag is raised, queued work is dropped and that
/// failure is returned once every started worker has reported; in-flight
/// transfers stop at their next body chunk. A worker that panics raises the
/// same flag and the call fails with `WorkerPanic`. Every worker thread is
/// joined before this function returns, on success and on failure.
pub fn download_ranges<F>(
    fetcher: &F,
    url: &str,
    output: &Path,
    ranges: &[ByteRange],
    progress_tx: Option<&tokio::sync::mpsc::Sender<ProgressStats>>,
) -> Result<(), DownloadError>
where
    F: RangeFetcher + Sync + ?Sized,
{
    let count = ranges.len();
    if count == 0 {
        return Ok(());
    }

    let work: Mutex<VecDeque<ByteRange>> = Mutex::new(ranges.iter().copied().collect());
    let abort = AtomicBool::new(false);
    let in_flight: Vec<AtomicU64> = (0..count).map(|_| AtomicU64::new(0)).collect();
    let total_bytes: u64 = ranges.iter().map(ByteRange::len).sum();
    let started = Instant::now();
    let (tx, rx) = mpsc::channel::<(usize, PartResult)>();

    let (first_error, panicked) = thread::scope(|scope| {
        let handles: Vec<_> = (0..count)
            .map(|_| {
                let tx = tx.clone();
                let work = &work;
                let abort = &abort;
                let in_flight = &in_flight;
                scope.spawn(move || {
                    let _guard = AbortOnPanic(abort);
                    loop {
                        if abort.load(Ordering::Relaxed) {
                            break;
                        }
                        let range = match work.lock() {
                            Ok(mut q) => match q.pop_front() {
                                Some(r) => r,
                                None => break,
                            },
                            Err(_) => break,
                        };
                        let res =
                            fetch_part(fetcher, url, output, &range, &in_flight[range.index], abort);
                        let _ = tx.send((range.index, res));
                    }
                })
            })
            .collect();
        drop(tx);

        let report = |parts_done: usize| {
            if let Some(progress_tx) = progress_tx {
                let bytes_done = in_flight.iter().map(|a| a.load(Ordering::Relaxed)).sum();
                let _ = progress_tx.try_send(ProgressStats {
                    bytes_done,
                    total_bytes,
                    elapsed_secs: started.elapsed().as_secs_f64(),
                    parts_done,
                    part_count: count,
                });
            }
        };

        let mut first_error: Option<(usize, FetchError)> = None;
        let mut parts_done = 0usize;
        let mut to_receive = count;
        while to_receive > 0 {
            let (index, res) = match rx.recv_timeout(PROGRESS_INTERVAL) {
                Ok(pair) => pair,
                Err(RecvTimeoutError::Timeout) => {
                    report(parts_done);
                    continue;
                }
                Err(RecvTimeoutError::Disconnected) => {
                    tracing::warn!(missing = to_receive, "all workers exited before reporting");
                    break;
                }
            };
            to_receive -= 1;
            match res {
                Ok(bytes) => {
                    parts_done += 1;
                    tracing::debug!(part = index, bytes, "part complete ({}/{})", parts_done, count);
                    report(parts_done);
                }
                // Never the root cause: something else raised the flag.
                Err(FetchError::Aborted) => {
                    tracing::debug!(part = index, "part stopped after abort");
                }
                Err(e) if first_error.is_none() => {
                    tracing::warn!(part = index, error = %e, "part failed; aborting remaining parts");
                    abort.store(true, Ordering::Relaxed);
                    let drained = work.lock().map(|mut q| q.drain(..).count()).unwrap_or(0);
                    to_receive = to_receive.saturating_sub(drained);
                    first_error = Some((index, e));
                }
                Err(e) => {
                    tracing::debug!(part = index, error = %e, "later part failure ignored");
                }
            }
        }

        let panicked = handles
            .into_iter()
            .map(|h| h.join())
            .filter(Result::is_err)
            .count();
        (first_error, panicked)
    });

    if let Some((part_index, source)) = first_error {
        return Err(DownloadError::RangeFetch { part_index, source });
    }
    if panicked > 0 {
        tracing::error!(panicked, "range worker panicked");
        return Err(DownloadError::WorkerPanic { panicked });
    }
    Ok(())
}

/// Raises the abort flag if the owning worker unwinds.
struct AbortOnPanic<'a>(&'a AtomicBool);

impl Drop for AbortOnPanic<'_> {
    fn drop(&mut self) {
        if thread::panicking() {
            self.0.store(true, Ordering::Relaxed);
        }
    }
}

/// Creates the part file for `range` and fetches into it.
fn fetch_part<F>(
    fetcher: &F,
    url: &str,
    output: &Path,
    range: &ByteRange,
    progress: &AtomicU64,
    abort: &AtomicBool,
) -> PartResult
where
    F: RangeFetcher + ?Sized,
{
    let mut writer = PartWriter::create(&part_path(output, range.index))?;
    let written = match fetcher.fetch_range(url, range, &mut writer, progress, abort) {
        Ok(n) => n,
        Err(e) => {
            tracing::debug!(part = range.index, path = %writer.path().display(), "part file left incomplete");
            return Err(e);
        }
    };
    writer.finish()?;
    Ok(written)
}
