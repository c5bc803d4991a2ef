//! Configuration management for termlaunch
//!
//! Two kinds of configuration live here: per-project launcher configs (the
//! files this tool launches from, see [`loader`]) and the application
//! settings that tune timing, the tmux host and config discovery.

pub mod custom_format;
pub mod json_format;
pub mod loader;
pub mod watcher;

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

use crate::error::{Error, Result};
use crate::session::LaunchTiming;

/// Environment variable pointing at an explicit settings file
pub const SETTINGS_ENV: &str = "TERMLAUNCH_SETTINGS";

/// Application settings
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub timing: TimingSettings,

    #[serde(default)]
    pub tmux: TmuxSettings,

    #[serde(default)]
    pub discovery: DiscoverySettings,
}

/// Launch timing, all in milliseconds
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimingSettings {
    /// Wait after creation before the first text injection
    #[serde(default = "default_grace_period_ms")]
    pub grace_period_ms: u64,

    /// Spacing between creations inside one group
    #[serde(default = "default_group_stagger_ms")]
    pub group_stagger_ms: u64,

    /// Spacing between `commands` entries when a terminal sets none
    #[serde(default = "default_command_delay_ms")]
    pub default_command_delay_ms: u64,
}

fn default_grace_period_ms() -> u64 {
    500
}

fn default_group_stagger_ms() -> u64 {
    200
}

fn default_command_delay_ms() -> u64 {
    crate::models::DEFAULT_COMMAND_DELAY_MS
}

impl Default for TimingSettings {
    fn default() -> Self {
        Self {
            grace_period_ms: default_grace_period_ms(),
            group_stagger_ms: default_group_stagger_ms(),
            default_command_delay_ms: default_command_delay_ms(),
        }
    }
}

impl TimingSettings {
    pub fn to_launch_timing(&self) -> LaunchTiming {
        LaunchTiming {
            grace_period: Duration::from_millis(self.grace_period_ms),
            group_stagger: Duration::from_millis(self.group_stagger_ms),
            default_command_delay: Duration::from_millis(self.default_command_delay_ms),
        }
    }
}

/// tmux host settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TmuxSettings {
    /// tmux executable
    #[serde(default = "default_tmux_program")]
    pub program: String,

    /// tmux session that owns every launched window
    #[serde(default = "default_tmux_session")]
    pub session: String,
}

fn default_tmux_program() -> String {
    "tmux".to_string()
}

fn default_tmux_session() -> String {
    "termlaunch".to_string()
}

impl Default for TmuxSettings {
    fn default() -> Self {
        Self {
            program: default_tmux_program(),
            session: default_tmux_session(),
        }
    }
}

/// Config file discovery settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscoverySettings {
    /// File names recognised as launcher configs, in preference order
    #[serde(default = "default_file_names")]
    pub file_names: Vec<String>,

    /// Directory levels searched below each workspace root (1 = root only)
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,
}

fn default_file_names() -> Vec<String> {
    vec![
        ".termlaunch.json".to_string(),
        "termlaunch.json".to_string(),
        ".termlaunch".to_string(),
    ]
}

fn default_max_depth() -> usize {
    1
}

impl Default for DiscoverySettings {
    fn default() -> Self {
        Self {
            file_names: default_file_names(),
            max_depth: default_max_depth(),
        }
    }
}

impl Settings {
    /// Load settings from the default location, falling back to defaults
    /// when no settings file exists
    pub fn load() -> Result<Self> {
        match Self::settings_path() {
            Some(path) if path.exists() => Self::load_from_path(&path),
            Some(path) => {
                debug!("No settings file at {}, using defaults", path.display());
                Ok(Self::default())
            }
            None => Ok(Self::default()),
        }
    }

    /// Load and validate settings from a specific TOML file
    pub fn load_from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| Error::SettingsLoad {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let settings: Settings = toml::from_str(&content).map_err(|e| Error::SettingsLoad {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        settings.validate().map_err(|reason| Error::SettingsLoad {
            path: path.to_path_buf(),
            reason,
        })?;

        debug!("Loaded settings from {}", path.display());
        Ok(settings)
    }

    /// `$TERMLAUNCH_SETTINGS`, else `<config dir>/termlaunch/settings.toml`
    pub fn settings_path() -> Option<PathBuf> {
        if let Some(explicit) = std::env::var_os(SETTINGS_ENV) {
            return Some(PathBuf::from(explicit));
        }
        dirs::config_dir().map(|dir| dir.join("termlaunch").join("settings.toml"))
    }

    /// Check field constraints, returning the first violation
    pub fn validate(&self) -> std::result::Result<(), String> {
        if self.tmux.program.trim().is_empty() {
            return Err("tmux.program cannot be empty".to_string());
        }

        if self.tmux.session.trim().is_empty() {
            return Err("tmux.session cannot be empty".to_string());
        }

        if self.discovery.file_names.is_empty()
            || self.discovery.file_names.iter().any(|n| n.trim().is_empty())
        {
            return Err("discovery.file_names must list at least one non-empty name".to_string());
        }

        if self.discovery.max_depth == 0 {
            return Err("discovery.max_depth must be at least 1".to_string());
        }

        Ok(())
    }
}
