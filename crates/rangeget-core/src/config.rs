use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

/// Browser-like User-Agent; some origins reject requests without one.
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

/// Global configuration loaded from `~/.config/rangeget/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RangegetConfig {
    /// Worker count used when the command line does not give one.
    pub default_workers: usize,
    /// User-Agent sent with the probe and every range request.
    pub user_agent: String,
    /// libcurl receive buffer size in bytes (chunk size handed to the part writer).
    pub buffer_size_bytes: usize,
    /// Copy buffer used when merging parts into the output.
    pub merge_buffer_bytes: usize,
    pub connect_timeout_secs: u64,
    /// Optional wall-clock limit per range fetch (None = no limit).
    #[serde(default)]
    pub fetch_timeout_secs: Option<u64>,
    /// Abort a fetch whose throughput stays below this many bytes/s for `low_speed_time_secs`.
    pub low_speed_limit_bytes: u32,
    pub low_speed_time_secs: u64,
    pub max_redirections: u32,
}

impl Default for RangegetConfig {
    fn default() -> Self {
        Self {
            default_workers: 8,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            buffer_size_bytes: 8192,
            merge_buffer_bytes: 8192,
            connect_timeout_secs: 30,
            fetch_timeout_secs: None,
            low_speed_limit_bytes: 1024,
            low_speed_time_secs: 60,
            max_redirections: 10,
        }
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("rangeget")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<RangegetConfig> {
    let path = config_path()?;
    if !path.exists() {
        let default_cfg = RangegetConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, toml)?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }

    let data = fs::read_to_string(&path)?;
    let cfg: RangegetConfig = toml::from_str(&data)?;
    Ok(cfg)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_values() {
        let cfg = RangegetConfig::default();
        assert_eq!(cfg.default_workers, 8);
        assert_eq!(cfg.buffer_size_bytes, 8192);
        assert_eq!(cfg.merge_buffer_bytes, 8192);
        assert!(cfg.fetch_timeout_secs.is_none());
        assert!(cfg.user_agent.starts_with("Mozilla/5.0"));
    }

    #[test]
    fn config_toml_roundtrip() {
        let cfg = RangegetConfig::default();
        let toml = toml::to_string_pretty(&cfg).unwrap();
        let parsed: RangegetConfig = toml::from_str(&toml).unwrap();
        assert_eq!(parsed.default_workers, cfg.default_workers);
        assert_eq!(parsed.user_agent, cfg.user_agent);
        assert_eq!(parsed.max_redirections, cfg.max_redirections);
    }

    #[test]
    fn config_toml_custom_values() {
        let toml = r#"
            default_workers = 4
            user_agent = "rangeget-test"
            buffer_size_bytes = 65536
            merge_buffer_bytes = 16384
            connect_timeout_secs = 5
            fetch_timeout_secs = 120
            low_speed_limit_bytes = 512
            low_speed_time_secs = 30
            max_redirections = 3
        "#;
        let cfg: RangegetConfig = toml::from_str(toml).unwrap();
        assert_eq!(cfg.default_workers, 4);
        assert_eq!(cfg.user_agent, "rangeget-test");
        assert_eq!(cfg.buffer_size_bytes, 65536);
        assert_eq!(cfg.fetch_timeout_secs, Some(120));
        assert_eq!(cfg.max_redirections, 3);
    }

    #[test]
    fn fetch_timeout_is_optional() {
        let toml = r#"
            default_workers = 2
            user_agent = "x"
            buffer_size_bytes = 8192
            merge_buffer_bytes = 8192
            connect_timeout_secs = 30
            low_speed_limit_bytes = 1024
            low_speed_time_secs = 60
            max_redirections = 10
        "#;
        let cfg: RangegetConfig = toml::from_str(toml).unwrap();
        assert!(cfg.fetch_timeout_secs.is_none());
    }
}
