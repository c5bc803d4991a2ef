//! termlaunch - launch batches of named terminal sessions from a project file
//!
//! A project describes its terminals once, in JSON or a small line-oriented
//! text format. termlaunch turns that description into tmux windows: it
//! names them, reconciles them with windows that are already open, resolves
//! their working directories and types their startup commands on a timed
//! schedule.
//!
//! ## Module Organization
//!
//! - [`config`] - Launcher config parsing, discovery, file watching, settings
//! - [`models`] - Config data model, colors, launch outcomes
//! - [`session`] - Orchestrator plus its host, prompt and clock seams
//! - [`commands`] - Launch-current, launch-all, init and watch operations
//! - [`mod@error`] - Error types and Result aliases
//!
//! ## Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//! use termlaunch::config::{loader::ConfigLoader, Settings};
//! use termlaunch::session::{Orchestrator, ScriptedPrompt, TmuxHost, TokioClock};
//!
//! # async fn run() -> termlaunch::Result<()> {
//! let settings = Settings::load()?;
//! let config = ConfigLoader::parse(r#"{"terminals": [{"name": "A", "command": "echo hi"}]}"#)?;
//!
//! let mut orchestrator = Orchestrator::new(
//!     Arc::new(TmuxHost::new(&settings.tmux)),
//!     Arc::new(ScriptedPrompt::new()),
//!     Arc::new(TokioClock::new()),
//! )
//! .with_timing(settings.timing.to_launch_timing());
//!
//! let outcome = orchestrator.launch(&config, None).await?;
//! orchestrator.run_dispatches().await;
//! println!("{}", outcome.summary());
//! # Ok(())
//! # }
//! ```
//!
//! ## Scheduling
//!
//! A batch runs on one task. Creation happens in declared order; command
//! text is queued per session on an injectable [`session::Clock`] and
//! delivered in due order. Live sessions are read once per batch, so two
//! concurrent batches against the same host can both create the same name.

pub mod commands;
pub mod config;
pub mod error;
pub mod models;
pub mod session;

// Re-exports for core functionality
pub use config::loader::ConfigLoader;
pub use config::Settings;
pub use error::{Error, Result};
pub use models::{LaunchOutcome, TerminalConfig, TerminalLauncherConfig};
pub use session::Orchestrator;

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name
pub const NAME: &str = env!("CARGO_PKG_NAME");

/// Application description
pub const DESCRIPTION: &str = env!("CARGO_PKG_DESCRIPTION");
