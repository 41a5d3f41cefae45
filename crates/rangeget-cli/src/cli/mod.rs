//! CLI for rangeget.

mod progress;

use anyhow::{Context, Result};
use clap::Parser;
use rangeget_core::client::{CurlClient, CurlOptions};
use rangeget_core::config;
use rangeget_core::probe::SizeProber;
use rangeget_core::scheduler::{run_download, DownloadRequest};
use rangeget_core::url_model::derive_filename;
use std::path::PathBuf;

/// Download one resource over N parallel byte ranges.
#[derive(Debug, Parser)]
#[command(name = "rangeget")]
#[command(about = "Parallel byte-range HTTP downloader", long_about = None)]
pub struct Cli {
    /// Direct HTTP/HTTPS URL to download.
    pub url: String,

    /// Output file. Defaults to a name derived from the response or URL.
    /// A second positional is always OUTPUT: `rangeget URL 4` writes a file
    /// named `4`; use `rangeget -n 4 URL` to set workers only.
    pub output: Option<PathBuf>,

    /// Number of parallel ranges (same as --workers). Requires OUTPUT before it.
    #[arg(value_name = "THREADS")]
    pub threads: Option<usize>,

    /// Number of parallel ranges; overrides the config default.
    #[arg(short = 'n', long, value_name = "N", conflicts_with = "threads")]
    pub workers: Option<usize>,

    /// Per-range timeout in seconds (default: none).
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Do not print progress.
    #[arg(short, long)]
    pub quiet: bool,
}

impl Cli {
    /// Worker count from the command line, else `default`.
    pub fn worker_count(&self, default: usize) -> usize {
        self.workers.or(self.threads).unwrap_or(default)
    }

    /// True for `rangeget URL 4`: the number went to OUTPUT, not THREADS.
    pub fn output_looks_like_thread_count(&self) -> bool {
        self.threads.is_none()
            && self.workers.is_none()
            && self
                .output
                .as_deref()
                .and_then(|p| p.to_str())
                .is_some_and(|s| s.parse::<usize>().is_ok())
    }
}

pub async fn run_from_args() -> Result<()> {
    let cli = Cli::parse();
    let mut cfg = config::load_or_init()?;
    tracing::debug!("loaded config: {:?}", cfg);
    if let Some(secs) = cli.timeout {
        cfg.fetch_timeout_secs = Some(secs);
    }

    if cli.output_looks_like_thread_count() {
        if let Some(out) = &cli.output {
            tracing::warn!(output = %out.display(), "numeric output name with no thread count");
            eprintln!(
                "warning: writing to a file named '{}'; use -n {} to set the worker count",
                out.display(),
                out.display()
            );
        }
    }

    let client = CurlClient::new(CurlOptions::from_config(&cfg));
    let workers = cli.worker_count(cfg.default_workers);
    let output = match cli.output.clone() {
        Some(p) => p,
        None => default_output(&client, &cli.url).await?,
    };

    let request = DownloadRequest::new(cli.url.clone(), output, workers)
        .with_merge_buffer(cfg.merge_buffer_bytes);

    let (progress_tx, progress_handle) = if cli.quiet {
        (None, None)
    } else {
        let (tx, rx) = tokio::sync::mpsc::channel(16);
        (Some(tx), Some(tokio::spawn(progress::print_progress(rx))))
    };

    let result = tokio::task::spawn_blocking(move || {
        run_download(&client, &request, progress_tx.as_ref())
    })
    .await
    .context("download task panicked")?;

    if let Some(handle) = progress_handle {
        let _ = handle.await;
    }

    let report = result?;
    for w in &report.cleanup_warnings {
        eprintln!("warning: {}", w);
    }
    println!(
        "Downloaded {} bytes in {} part(s) to {} ({:.1}s)",
        report.total_size,
        report.part_count,
        report.output.display(),
        report.elapsed.as_secs_f64()
    );
    Ok(())
}

/// Output path in the current directory, named from Content-Disposition or the URL.
async fn default_output(client: &CurlClient, url: &str) -> Result<PathBuf> {
    let probe_client = client.clone();
    let probe_url = url.to_string();
    let disposition = tokio::task::spawn_blocking(move || probe_client.probe(&probe_url))
        .await
        .context("probe task panicked")?
        .ok()
        .and_then(|p| p.content_disposition);
    let name = derive_filename(url, disposition.as_deref());
    Ok(std::env::current_dir()?.join(name))
}
