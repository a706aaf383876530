use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};
use tracing::info;

use crate::{
    errors::{LedgerError, Result},
    reminder::{schedule::DEFAULT_CHECK_INTERVAL_SECS, ReminderSettings},
    utils::{app_data_dir, config_file_in, ensure_dir, write_atomic},
};

const DEFAULT_TICK_RESOLUTION_MS: u64 = 1000;
/// Longest accepted budget check interval, one year.
pub const MAX_CHECK_INTERVAL_SECS: u64 = 365 * 24 * 60 * 60;
/// Longest accepted tick resolution, one hour.
pub const MAX_TICK_RESOLUTION_MS: u64 = 60 * 60 * 1000;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Config {
    #[serde(default)]
    pub reminders: ReminderSettings,
    #[serde(default = "Config::default_check_interval")]
    pub budget_check_interval_secs: u64,
    #[serde(default = "Config::default_tick_resolution")]
    pub tick_resolution_ms: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            reminders: ReminderSettings::default(),
            budget_check_interval_secs: Self::default_check_interval(),
            tick_resolution_ms: Self::default_tick_resolution(),
            data_dir: None,
        }
    }
}

impl Config {
    fn default_check_interval() -> u64 {
        DEFAULT_CHECK_INTERVAL_SECS as u64
    }

    fn default_tick_resolution() -> u64 {
        DEFAULT_TICK_RESOLUTION_MS
    }

    pub fn validate(&self) -> Result<()> {
        if !(1..=MAX_CHECK_INTERVAL_SECS).contains(&self.budget_check_interval_secs) {
            return Err(LedgerError::InvalidInput(format!(
                "budget check interval must be between 1 and {MAX_CHECK_INTERVAL_SECS} seconds, got {}",
                self.budget_check_interval_secs
            )));
        }
        if !(1..=MAX_TICK_RESOLUTION_MS).contains(&self.tick_resolution_ms) {
            return Err(LedgerError::InvalidInput(format!(
                "tick resolution must be between 1 and {MAX_TICK_RESOLUTION_MS} ms, got {}",
                self.tick_resolution_ms
            )));
        }
        if let Some(message) = self.reminders.validation_error() {
            return Err(LedgerError::InvalidInput(message));
        }
        Ok(())
    }

    /// Clamped to `1..=MAX_CHECK_INTERVAL_SECS` for configs that skipped `validate`.
    pub fn budget_check_interval(&self) -> chrono::Duration {
        let secs = self
            .budget_check_interval_secs
            .clamp(1, MAX_CHECK_INTERVAL_SECS) as i64;
        chrono::Duration::try_seconds(secs)
            .unwrap_or_else(|| chrono::Duration::seconds(DEFAULT_CHECK_INTERVAL_SECS))
    }

    pub fn tick_resolution(&self) -> Duration {
        Duration::from_millis(self.tick_resolution_ms.clamp(1, MAX_TICK_RESOLUTION_MS))
    }

    /// Where account documents live: `data_dir` when set, else `base`.
    pub fn storage_root(&self, base: &Path) -> PathBuf {
        self.data_dir.clone().unwrap_or_else(|| base.to_path_buf())
    }
}

pub struct ConfigManager {
    base: PathBuf,
    path: PathBuf,
}

impl ConfigManager {
    pub fn new() -> Result<Self> {
        Self::from_base(app_data_dir())
    }

    pub fn with_base_dir(base: PathBuf) -> Result<Self> {
        Self::from_base(base)
    }

    fn from_base(base: PathBuf) -> Result<Self> {
        ensure_dir(&base)?;
        let path = config_file_in(&base);
        Ok(Self { base, path })
    }

    pub fn base_dir(&self) -> &Path {
        &self.base
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns defaults when no config file exists yet.
    pub fn load(&self) -> Result<Config> {
        if !self.path.exists() {
            return Ok(Config::default());
        }
        let data = fs::read_to_string(&self.path)?;
        let config: Config = serde_json::from_str(&data)?;
        config.validate()?;
        Ok(config)
    }

    pub fn save(&self, config: &Config) -> Result<()> {
        config.validate()?;
        let json = serde_json::to_string_pretty(config)?;
        write_atomic(&self.path, &json)?;
        info!(path = %self.path.display(), "configuration saved");
        Ok(())
    }
}
