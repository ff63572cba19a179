use anyhow::{anyhow, Result};
use serde::Deserialize;
use std::{path::PathBuf, time::Duration};

use super::{FilterConfig, HookConfig};

pub const DEFAULT_NOTIFY_INTERVAL: u64 = 60;

/// Represents the `[notify]` section of the config file.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct NotifierConfig {
    /// Seconds between two ticks.
    pub interval: u64,
    pub state_file: Option<PathBuf>,
    pub filter: FilterConfig,
    pub hook: HookConfig,
}

impl Default for NotifierConfig {
    fn default() -> Self {
        Self {
            interval: DEFAULT_NOTIFY_INTERVAL,
            state_file: None,
            filter: FilterConfig::default(),
            hook: HookConfig::default(),
        }
    }
}

impl NotifierConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval.max(1))
    }

    /// State file, defaulting to `<config dir>/mailaid/mail2bot-state.toml`.
    pub fn state_file(&self) -> Result<PathBuf> {
        match &self.state_file {
            Some(path) => Ok(path.clone()),
            None => dirs::config_dir()
                .map(|dir| dir.join("mailaid").join("mail2bot-state.toml"))
                .ok_or_else(|| anyhow!("cannot find config directory")),
        }
    }
}
