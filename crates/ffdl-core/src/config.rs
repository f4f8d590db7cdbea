use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::http::HttpTimeouts;
use crate::retry::RetryPolicy;

/// Default GraphQL endpoint of the meeting API.
pub const DEFAULT_ENDPOINT: &str = "https://api.fireflies.ai/graphql";

/// Largest page the transcripts query accepts.
pub const MAX_PAGE_SIZE: u32 = 50;

/// Retry policy parameters (optional section in config.toml).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Maximum number of attempts per page fetch or transfer (including the first).
    pub max_attempts: u32,
    /// Base delay in seconds for exponential backoff (e.g. 1.0 = 1s).
    pub base_delay_secs: f64,
    /// Maximum backoff delay in seconds; also caps `Retry-After`.
    pub max_delay_secs: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            base_delay_secs: 1.0,
            max_delay_secs: 60,
        }
    }
}

impl RetryConfig {
    pub fn to_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.max_attempts.max(1),
            base_delay: Duration::from_secs_f64(self.base_delay_secs.max(0.0)),
            max_delay: Duration::from_secs(self.max_delay_secs),
        }
    }
}

/// Global configuration loaded from `~/.config/ffdl/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FfdlConfig {
    /// GraphQL endpoint of the meeting API.
    pub endpoint: String,
    /// Records requested per page (clamped to 1..=50).
    pub page_size: u32,
    /// Minimum delay between page fetches, in seconds.
    pub throttle_secs: f64,
    /// TCP/TLS connect timeout for every request.
    pub connect_timeout_secs: u64,
    /// Whole-request timeout for API calls and size probes.
    pub request_timeout_secs: u64,
    /// Hard timeout for a single video transfer.
    pub transfer_timeout_secs: u64,
    /// Optional retry policy; if missing, built-in defaults are used.
    #[serde(default)]
    pub retry: Option<RetryConfig>,
}

impl Default for FfdlConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            page_size: MAX_PAGE_SIZE,
            throttle_secs: 0.25,
            connect_timeout_secs: 30,
            request_timeout_secs: 60,
            transfer_timeout_secs: 6 * 3600,
            retry: None,
        }
    }
}

impl FfdlConfig {
    pub fn retry_policy(&self) -> RetryPolicy {
        self.retry.clone().unwrap_or_default().to_policy()
    }

    pub fn page_size(&self) -> u32 {
        self.page_size.clamp(1, MAX_PAGE_SIZE)
    }

    pub fn throttle(&self) -> Duration {
        throttle_from_secs(self.throttle_secs)
    }

    pub fn timeouts(&self) -> HttpTimeouts {
        HttpTimeouts {
            connect: Duration::from_secs(self.connect_timeout_secs),
            request: Duration::from_secs(self.request_timeout_secs),
            transfer: Duration::from_secs(self.transfer_timeout_secs),
        }
    }
}

/// Negative, NaN and infinite values disable throttling.
pub fn throttle_from_secs(secs: f64) -> Duration {
    if secs.is_finite() && secs > 0.0 {
        Duration::from_secs_f64(secs)
    } else {
        Duration::ZERO
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("ffdl")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<FfdlConfig> {
    load_or_init_at(&config_path()?)
}

pub fn load_or_init_at(path: &Path) -> Result<FfdlConfig> {
    if !path.exists() {
        let default_cfg = FfdlConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, toml).with_context(|| format!("write config: {}", path.display()))?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }

    let data =
        fs::read_to_string(path).with_context(|| format!("read config: {}", path.display()))?;
    let cfg: FfdlConfig =
        toml::from_str(&data).with_context(|| format!("parse config: {}", path.display()))?;
    Ok(cfg)
}
