//! Logging init: append to `rangeget.log` under the XDG state dir, or stderr.
//!
//! The filter comes from `RANGEGET_LOG`, then `RUST_LOG`, then
//! `info,rangeget_core=debug` (stage transitions plus per-part detail).

use anyhow::{Context, Result};
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

const DEFAULT_FILTER: &str = "info,rangeget_core=debug";
const FILTER_ENV: &str = "RANGEGET_LOG";
const LOG_FILE_NAME: &str = "rangeget.log";

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_env(FILTER_ENV)
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

/// `<state_dir>/rangeget.log`, creating `state_dir` if needed.
fn open_log_file(state_dir: &Path) -> Result<(PathBuf, File)> {
    fs::create_dir_all(state_dir)
        .with_context(|| format!("create log dir {}", state_dir.display()))?;
    let path = state_dir.join(LOG_FILE_NAME);
    let file = File::options()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("open {}", path.display()))?;
    Ok((path, file))
}

/// Log to `~/.local/state/rangeget/rangeget.log` and return that path.
/// Errors (unwritable state dir, subscriber already set) leave the caller
/// free to fall back to `init_logging_stderr`.
pub fn init_logging() -> Result<PathBuf> {
    let state_dir = xdg::BaseDirectories::with_prefix("rangeget")?.get_state_home();
    let (path, file) = open_log_file(&state_dir)?;

    tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .try_init()
        .map_err(|e| anyhow::anyhow!("install log subscriber: {}", e))?;

    tracing::info!(pid = std::process::id(), "rangeget logging to {}", path.display());
    Ok(path)
}

/// Log to stderr only. Does nothing if a subscriber is already installed.
pub fn init_logging_stderr() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .try_init();
}
