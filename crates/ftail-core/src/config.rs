use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::scheduler::ScheduleMode;
use crate::tail::{TargetSpec, Targets, DEFAULT_MAX_RETRIES, DEFAULT_WAIT_SECS};
use crate::transport::CurlTransport;

fn default_wait_secs() -> u64 {
    DEFAULT_WAIT_SECS
}

fn default_max_retries() -> u32 {
    DEFAULT_MAX_RETRIES
}

fn default_connect_timeout_secs() -> u64 {
    15
}

fn default_request_timeout_secs() -> u64 {
    30
}

/// Global configuration loaded from `~/.config/ftail/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FtailConfig {
    /// Base poll interval in seconds for targets that do not set `wait`.
    #[serde(default = "default_wait_secs")]
    pub wait_secs: u64,
    /// Retry ceiling for targets that do not set `max_retries`.
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    /// Report no-change and error results for every target.
    #[serde(default)]
    pub always_callback: bool,
    /// Log each target's position at info level after every healthy cycle.
    #[serde(default)]
    pub verbose: bool,
    /// libcurl connect timeout for probes and fetches.
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
    /// Whole-request timeout for probes and fetches.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    /// "concurrent" (one thread per target) or "round-robin".
    #[serde(default)]
    pub schedule: ScheduleMode,
    /// Targets followed when none are given on the command line: a single
    /// `[target]` table or an array of `[[target]]` tables.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<Targets>,
}

impl Default for FtailConfig {
    fn default() -> Self {
        Self {
            wait_secs: default_wait_secs(),
            max_retries: default_max_retries(),
            always_callback: false,
            verbose: false,
            connect_timeout_secs: default_connect_timeout_secs(),
            request_timeout_secs: default_request_timeout_secs(),
            schedule: ScheduleMode::default(),
            target: None,
        }
    }
}

impl FtailConfig {
    /// Fills a target's unset fields from the config defaults.
    pub fn apply_defaults(&self, mut spec: TargetSpec) -> TargetSpec {
        spec.wait.get_or_insert(self.wait_secs);
        spec.max_retries.get_or_insert(self.max_retries);
        spec.always_callback |= self.always_callback;
        spec.verbose |= self.verbose;
        spec
    }

    /// Targets configured in the file, with defaults applied.
    pub fn targets(&self) -> Result<Vec<TargetSpec>> {
        let Some(targets) = self.target.clone() else {
            return Ok(Vec::new());
        };
        let specs = targets.into_specs().context("invalid [target] section")?;
        Ok(specs.into_iter().map(|s| self.apply_defaults(s)).collect())
    }

    /// Pretty TOML rendering, as written for a fresh config file.
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).context("serializing config")
    }

    /// Transport with the configured timeouts.
    pub fn transport(&self) -> CurlTransport {
        CurlTransport::new(
            Duration::from_secs(self.connect_timeout_secs),
            Duration::from_secs(self.request_timeout_secs),
        )
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("ftail")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<FtailConfig> {
    let path = config_path()?;
    if !path.exists() {
        let default_cfg = FtailConfig::default();
        let toml = default_cfg.to_toml()?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, toml)?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }
    load_from_path(&path)
}

/// Load configuration from an explicit path.
pub fn load_from_path(path: &Path) -> Result<FtailConfig> {
    let data = fs::read_to_string(path)
        .with_context(|| format!("reading config {}", path.display()))?;
    let cfg: FtailConfig =
        toml::from_str(&data).with_context(|| format!("parsing config {}", path.display()))?;
    Ok(cfg)
}
