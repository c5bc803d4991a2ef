//! Terminal Launcher Configuration Model
//!
//! The canonical in-memory shape of a launcher config file. Both the JSON
//! encoding and the line-oriented text encoding decode into these types.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

use super::TerminalColor;

/// Default spacing between sequential `commands` entries, in milliseconds
pub const DEFAULT_COMMAND_DELAY_MS: u64 = 100;

/// One terminal session to launch
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TerminalConfig {
    /// Display name before any project prefix is applied
    #[serde(default)]
    pub name: String,

    /// Working directory, relative or absolute
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cwd: Option<PathBuf>,

    /// Script path sent to the session as a single line
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub script: Option<PathBuf>,

    /// Commands sent one after another, spaced by `command_delay`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub commands: Option<Vec<String>>,

    /// Single command sent once the session is ready
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub command: Option<String>,

    /// Milliseconds between consecutive `commands`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub command_delay: Option<u64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<TerminalColor>,

    /// Host icon identifier, passed through untouched
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,

    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub env: HashMap<String, String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shell_path: Option<PathBuf>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shell_args: Option<Vec<String>>,
}

/// The single text source a terminal dispatches after creation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandSource<'a> {
    Script(&'a std::path::Path),
    Commands(&'a [String]),
    Command(&'a str),
    None,
}

impl TerminalConfig {
    /// Create a terminal config with just a name
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Pick the command source by fixed priority: script, commands, command.
    ///
    /// Empty values count as absent.
    pub fn command_source(&self) -> CommandSource<'_> {
        if let Some(script) = self.script.as_deref().filter(|s| !s.as_os_str().is_empty()) {
            return CommandSource::Script(script);
        }
        if let Some(commands) = self.commands.as_deref().filter(|c| !c.is_empty()) {
            return CommandSource::Commands(commands);
        }
        if let Some(command) = self.command.as_deref().filter(|c| !c.is_empty()) {
            return CommandSource::Command(command);
        }
        CommandSource::None
    }

    /// Delay between `commands` entries, falling back to the given default
    pub fn command_delay_or(&self, default_ms: u64) -> u64 {
        self.command_delay.unwrap_or(default_ms)
    }
}

/// Terminals launched together with a short creation stagger
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TerminalGroupConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default)]
    pub terminals: Vec<TerminalConfig>,
}

/// Top-level launcher config
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TerminalLauncherConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub groups: Option<Vec<TerminalGroupConfig>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub terminals: Option<Vec<TerminalConfig>>,
}

impl TerminalLauncherConfig {
    /// Config holding only ungrouped terminals
    pub fn from_terminals(terminals: Vec<TerminalConfig>) -> Self {
        Self {
            version: None,
            groups: None,
            terminals: Some(terminals),
        }
    }

    pub fn groups(&self) -> &[TerminalGroupConfig] {
        self.groups.as_deref().unwrap_or_default()
    }

    pub fn terminals(&self) -> &[TerminalConfig] {
        self.terminals.as_deref().unwrap_or_default()
    }

    /// Number of terminals across groups and the ungrouped list
    pub fn terminal_count(&self) -> usize {
        self.groups().iter().map(|g| g.terminals.len()).sum::<usize>() + self.terminals().len()
    }
}
