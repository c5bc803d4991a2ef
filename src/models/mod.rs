//! Core data models for termlaunch
//!
//! This module contains the data structures shared by the config loader and
//! the session orchestrator: the launcher config itself, the color palette
//! mapping, and launch outcomes.

pub mod color;
pub mod config;
pub mod outcome;

// Re-exports for convenience
pub use color::{HostColor, TerminalColor};
pub use config::{
    CommandSource, TerminalConfig, TerminalGroupConfig, TerminalLauncherConfig,
    DEFAULT_COMMAND_DELAY_MS,
};
pub use outcome::{LaunchOutcome, RequestFailure};
