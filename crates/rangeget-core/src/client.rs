//! libcurl transport settings shared by the probe and the range fetcher.

use crate::config::RangegetConfig;
use curl::easy::Easy;
use std::time::Duration;

/// Transport options derived from config (copied into every curl handle).
#[derive(Debug, Clone)]
pub struct CurlOptions {
    pub user_agent: String,
    pub connect_timeout: Duration,
    /// Per-fetch wall-clock limit; `None` means unlimited.
    pub fetch_timeout: Option<Duration>,
    pub low_speed_limit: u32,
    pub low_speed_time: Duration,
    pub buffer_size: usize,
    pub max_redirections: u32,
}

impl CurlOptions {
    pub fn from_config(cfg: &RangegetConfig) -> Self {
        Self {
            user_agent: cfg.user_agent.clone(),
            connect_timeout: Duration::from_secs(cfg.connect_timeout_secs),
            fetch_timeout: cfg.fetch_timeout_secs.map(Duration::from_secs),
            low_speed_limit: cfg.low_speed_limit_bytes,
            low_speed_time: Duration::from_secs(cfg.low_speed_time_secs),
            buffer_size: cfg.buffer_size_bytes,
            max_redirections: cfg.max_redirections,
        }
    }
}

impl Default for CurlOptions {
    fn default() -> Self {
        Self::from_config(&RangegetConfig::default())
    }
}

/// HTTP client backed by one libcurl Easy handle per request.
/// Implements both `SizeProber` and `RangeFetcher`.
#[derive(Debug, Clone, Default)]
pub struct CurlClient {
    opts: CurlOptions,
}

impl CurlClient {
    pub fn new(opts: CurlOptions) -> Self {
        Self { opts }
    }

    pub fn options(&self) -> &CurlOptions {
        &self.opts
    }

    /// A GET handle for `url` with the User-Agent, redirect and connect settings applied.
    pub(crate) fn easy(&self, url: &str) -> Result<Easy, curl::Error> {
        let mut easy = Easy::new();
        easy.url(url)?;
        easy.get(true)?;
        easy.useragent(&self.opts.user_agent)?;
        easy.follow_location(true)?;
        easy.max_redirections(self.opts.max_redirections)?;
        easy.connect_timeout(self.opts.connect_timeout)?;
        Ok(easy)
    }
}
