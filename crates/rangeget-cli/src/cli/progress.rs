//! Console progress lines.

use rangeget_core::progress::ProgressStats;
use std::io::Write;
use std::time::{Duration, Instant};

const PRINT_INTERVAL: Duration = Duration::from_millis(500);

/// Prints progress until the sender is dropped.
pub async fn print_progress(mut rx: tokio::sync::mpsc::Receiver<ProgressStats>) {
    let mut last_print: Option<Instant> = None;
    let mut printed = false;
    while let Some(stats) = rx.recv().await {
        let due = last_print.map_or(true, |t| t.elapsed() >= PRINT_INTERVAL);
        if due || stats.bytes_done >= stats.total_bytes {
            print!("\r{}", format_line(&stats));
            let _ = std::io::stdout().flush();
            last_print = Some(Instant::now());
            printed = true;
        }
    }
    if printed {
        println!();
    }
}

fn format_line(stats: &ProgressStats) -> String {
    let done_mib = stats.bytes_done as f64 / 1_048_576.0;
    let total_mib = stats.total_bytes as f64 / 1_048_576.0;
    let rate_mib = stats.bytes_per_sec() / 1_048_576.0;
    let eta = stats
        .eta_secs()
        .map(|s| format!("{:.0}s", s))
        .unwrap_or_else(|| "?".to_string());
    format!(
        "  {:.1} / {:.1} MiB ({:.1}%)  {:.2} MiB/s  parts {}/{}  ETA {}  ",
        done_mib,
        total_mib,
        stats.fraction() * 100.0,
        rate_mib,
        stats.parts_done,
        stats.part_count,
        eta
    )
}
