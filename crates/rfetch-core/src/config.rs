use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use crate::retry::RetrySettings;
use crate::transport::HttpOptions;

/// Retry controller parameters (optional section in config.toml).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Nominal read size in bytes.
    pub chunk_size_bytes: usize,
    /// Floor the chunk size never shrinks below.
    pub min_chunk_size_bytes: usize,
    /// Wait before a retry, in seconds (e.g. 0.5 = 500ms).
    pub initial_wait_secs: f64,
    /// Cap for the lengthened wait, in seconds.
    pub max_wait_secs: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        let s = RetrySettings::default();
        Self {
            chunk_size_bytes: s.chunk_size(),
            min_chunk_size_bytes: s.min_chunk_size(),
            initial_wait_secs: s.initial_wait().as_secs_f64(),
            max_wait_secs: s.max_wait().as_secs_f64(),
        }
    }
}

impl RetryConfig {
    /// Controller settings; negative or non-finite seconds fall back to defaults.
    pub fn to_settings(&self) -> RetrySettings {
        let defaults = RetrySettings::default();
        let secs = |v: f64, fallback: Duration| Duration::try_from_secs_f64(v).unwrap_or(fallback);
        RetrySettings::new(
            self.chunk_size_bytes,
            self.min_chunk_size_bytes,
            secs(self.initial_wait_secs, defaults.initial_wait()),
            secs(self.max_wait_secs, defaults.max_wait()),
        )
    }
}

/// Global configuration loaded from `~/.config/rfetch/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RfetchConfig {
    /// Maximum number of fetches running at once.
    pub max_parallel_fetches: usize,
    /// Connect timeout in seconds.
    pub connect_timeout_secs: u64,
    /// Abort a read when throughput stays below this many bytes/sec ...
    pub low_speed_limit_bytes: u32,
    /// ... for this many seconds.
    pub low_speed_time_secs: u64,
    /// Optional bandwidth cap in bytes per second per fetch (None = no cap).
    #[serde(default)]
    pub max_bytes_per_sec: Option<u64>,
    /// Optional retry section; if missing, built-in defaults are used.
    #[serde(default)]
    pub retry: Option<RetryConfig>,
}

impl Default for RfetchConfig {
    fn default() -> Self {
        Self {
            max_parallel_fetches: 4,
            connect_timeout_secs: 30,
            low_speed_limit_bytes: 1024,
            low_speed_time_secs: 60,
            max_bytes_per_sec: None,
            retry: None,
        }
    }
}

impl RfetchConfig {
    pub fn retry_settings(&self) -> RetrySettings {
        self.retry
            .as_ref()
            .map(RetryConfig::to_settings)
            .unwrap_or_default()
    }

    pub fn http_options(&self) -> HttpOptions {
        HttpOptions {
            connect_timeout: Duration::from_secs(self.connect_timeout_secs),
            low_speed_limit: self.low_speed_limit_bytes,
            low_speed_time: Duration::from_secs(self.low_speed_time_secs),
            max_recv_speed: self.max_bytes_per_sec,
        }
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("rfetch")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<RfetchConfig> {
    let path = config_path()?;
    if !path.exists() {
        let default_cfg = RfetchConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, toml)?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }

    let data = fs::read_to_string(&path)?;
    let cfg: RfetchConfig =
        toml::from_str(&data).with_context(|| format!("invalid config {}", path.display()))?;
    Ok(cfg)
}
