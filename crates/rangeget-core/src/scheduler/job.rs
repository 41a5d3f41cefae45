//! Download job record and its state machine.

use std::fmt;
use std::path::PathBuf;

use crate::segmenter::ByteRange;

/// Lifecycle of one download job. No transition goes back to an earlier state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobState {
    Planning,
    Probing,
    Fetching,
    Merging,
    CleaningUp,
    Done,
    Failed,
}

impl JobState {
    pub fn can_transition_to(self, next: JobState) -> bool {
        use JobState::*;
        matches!(
            (self, next),
            (Planning, Probing)
                | (Probing, Fetching)
                | (Fetching, Merging)
                | (Merging, CleaningUp)
                | (CleaningUp, Done)
                | (Probing, Failed)
                | (Fetching, Failed)
                | (Merging, Failed)
        )
    }
}

impl fmt::Display for JobState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            JobState::Planning => "planning",
            JobState::Probing => "probing",
            JobState::Fetching => "fetching",
            JobState::Merging => "merging",
            JobState::CleaningUp => "cleaning-up",
            JobState::Done => "done",
            JobState::Failed => "failed",
        };
        f.write_str(s)
    }
}

/// One download: the resource, where it goes, and its planned ranges.
#[derive(Debug, Clone)]
pub struct DownloadJob {
    pub url: String,
    pub output: PathBuf,
    pub workers: usize,
    /// Known after probing.
    pub total_size: Option<u64>,
    pub ranges: Vec<ByteRange>,
    state: JobState,
}

impl DownloadJob {
    pub fn new(url: impl Into<String>, output: impl Into<PathBuf>, workers: usize) -> Self {
        Self {
            url: url.into(),
            output: output.into(),
            workers,
            total_size: None,
            ranges: Vec::new(),
            state: JobState::Planning,
        }
    }

    pub fn state(&self) -> JobState {
        self.state
    }

    /// Move to `next`. Returns false (and stays put) if the transition is not allowed.
    pub fn advance(&mut self, next: JobState) -> bool {
        if !self.state.can_transition_to(next) {
            tracing::error!(from = %self.state, to = %next, "illegal job state transition");
            return false;
        }
        tracing::info!(url = %self.url, "{} -> {}", self.state, next);
        self.state = next;
        true
    }
}
