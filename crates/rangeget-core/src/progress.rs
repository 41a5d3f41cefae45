//! Progress snapshots for observers (bytes done, rate, ETA).
//!
//! Sent by the download pool; nothing in the pipeline depends on them.

/// Snapshot of download progress for one job.
#[derive(Debug, Clone, PartialEq)]
pub struct ProgressStats {
    /// Bytes written to part files so far.
    pub bytes_done: u64,
    pub total_bytes: u64,
    /// Seconds since the fetch stage started.
    pub elapsed_secs: f64,
    pub parts_done: usize,
    pub part_count: usize,
}

impl ProgressStats {
    /// Download rate in bytes per second (0 if elapsed is 0).
    pub fn bytes_per_sec(&self) -> f64 {
        if self.elapsed_secs <= 0.0 {
            return 0.0;
        }
        self.bytes_done as f64 / self.elapsed_secs
    }

    /// Estimated seconds remaining (None if nothing has arrived yet).
    pub fn eta_secs(&self) -> Option<f64> {
        let remaining = self.total_bytes.saturating_sub(self.bytes_done);
        if remaining == 0 {
            return Some(0.0);
        }
        let rate = self.bytes_per_sec();
        if rate <= 0.0 {
            return None;
        }
        Some(remaining as f64 / rate)
    }

    /// Fraction complete in [0.0, 1.0].
    pub fn fraction(&self) -> f64 {
        if self.total_bytes == 0 {
            return 1.0;
        }
        (self.bytes_done as f64 / self.total_bytes as f64).min(1.0)
    }
}
