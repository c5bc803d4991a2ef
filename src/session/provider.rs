//! Host Session Provider Abstraction
//!
//! Everything the orchestrator needs from the terminal host sits behind
//! [`SessionProvider`], so batches can be driven against tmux in production
//! and against a recording mock in tests.

use async_trait::async_trait;
use std::collections::HashMap;
use std::path::PathBuf;

use crate::error::Result;
use crate::models::HostColor;

/// Everything the host needs to allocate one session
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionSpec {
    /// Final name after prefixing and collision handling
    pub name: String,
    /// Resolved working directory; `None` leaves it to the host
    pub cwd: Option<PathBuf>,
    pub env: HashMap<String, String>,
    pub shell_path: Option<PathBuf>,
    pub shell_args: Vec<String>,
    pub color: Option<HostColor>,
    pub icon: Option<String>,
    /// Bring the session to the foreground on creation
    pub focus: bool,
}

/// A session created by the orchestrator
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SessionHandle {
    /// Host identifier (for tmux, the window id such as `@3`)
    pub id: String,
    pub name: String,
}

/// A session currently open in the host, whoever created it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LiveSession {
    pub id: String,
    pub name: String,
}

/// Operations the orchestrator performs against the terminal host
#[async_trait]
pub trait SessionProvider: Send + Sync {
    /// List every session currently open in the host
    ///
    /// # Errors
    /// Returns an error if the host cannot be queried
    async fn live_sessions(&self) -> Result<Vec<LiveSession>>;

    /// Allocate a new session
    ///
    /// # Arguments
    /// * `spec` - Name, working directory, environment and presentation
    ///
    /// # Errors
    /// Returns an error if the host refuses to create the session
    async fn create(&self, spec: &SessionSpec) -> Result<SessionHandle>;

    /// Close a session by host id
    ///
    /// # Errors
    /// Returns an error if the session cannot be closed
    async fn dispose(&self, id: &str) -> Result<()>;

    /// Type one line of text into a session, followed by Enter
    ///
    /// # Errors
    /// Returns an error if the text cannot be delivered
    async fn send_text(&self, id: &str, text: &str) -> Result<()>;
}
