use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use crate::downloader::TransferOptions;
use crate::playlist::FetchOptions;
use crate::scheduler::SchedulerOptions;
use crate::source::DEFAULT_RENDITION_GROUP;

/// curl limits for part transfers (optional section in config.toml).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferConfig {
    pub connect_timeout_secs: u64,
    /// Abort when throughput stays below this many bytes/s ...
    pub low_speed_limit_bytes: u32,
    /// ... for this many seconds.
    pub low_speed_time_secs: u64,
    /// Hard limit per part.
    pub timeout_secs: u64,
}

impl Default for TransferConfig {
    fn default() -> Self {
        let opts = TransferOptions::default();
        Self {
            connect_timeout_secs: opts.connect_timeout.as_secs(),
            low_speed_limit_bytes: opts.low_speed_limit,
            low_speed_time_secs: opts.low_speed_time.as_secs(),
            timeout_secs: opts.timeout.as_secs(),
        }
    }
}

/// Global configuration loaded from `~/.config/vodgrab/config.toml`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VodgrabConfig {
    /// Maximum concurrent part transfers across all broadcasts.
    pub worker_count: usize,
    /// Receive buffer per transfer; progress is reported once per buffer.
    pub buffer_bytes: usize,
    /// Denominator of reported progress values.
    pub progress_resolution: u64,
    /// Rendition group picked from master playlists unless a broadcast names one.
    pub rendition_group: String,
    /// Optional curl limits; if missing, built-in defaults are used.
    #[serde(default)]
    pub transfer: Option<TransferConfig>,
}

impl Default for VodgrabConfig {
    fn default() -> Self {
        Self {
            worker_count: 4,
            buffer_bytes: 64 * 1024,
            progress_resolution: crate::progress::DEFAULT_RESOLUTION,
            rendition_group: DEFAULT_RENDITION_GROUP.to_string(),
            transfer: None,
        }
    }
}

impl VodgrabConfig {
    pub fn transfer_options(&self) -> TransferOptions {
        let limits = self.transfer.clone().unwrap_or_default();
        TransferOptions {
            buffer_bytes: self.buffer_bytes.max(1),
            connect_timeout: Duration::from_secs(limits.connect_timeout_secs),
            low_speed_limit: limits.low_speed_limit_bytes,
            low_speed_time: Duration::from_secs(limits.low_speed_time_secs),
            timeout: Duration::from_secs(limits.timeout_secs),
        }
    }

    pub fn scheduler_options(&self) -> SchedulerOptions {
        SchedulerOptions {
            transfer: self.transfer_options(),
            progress_resolution: self.progress_resolution.max(1),
        }
    }

    /// Playlist fetches reuse the transfer connect timeout.
    pub fn fetch_options(&self) -> FetchOptions {
        let mut opts = FetchOptions::default();
        if let Some(limits) = &self.transfer {
            opts.connect_timeout = Duration::from_secs(limits.connect_timeout_secs);
        }
        opts
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("vodgrab")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<VodgrabConfig> {
    let path = config_path()?;
    if !path.exists() {
        let default_cfg = VodgrabConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, toml)?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }

    let data = fs::read_to_string(&path)?;
    let cfg: VodgrabConfig = toml::from_str(&data)?;
    Ok(cfg)
}
