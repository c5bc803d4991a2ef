//! tmux Session Host
//!
//! Every launched terminal is a window inside one tmux session (by default
//! `termlaunch`). Live sessions are the windows of that session, so they
//! outlive the process that created them and are visible to later runs.
//!
//! Argument vectors are built by plain functions so they can be checked
//! without a tmux server.

use async_trait::async_trait;
use tokio::process::Command;
use tracing::{debug, warn};

use super::provider::{LiveSession, SessionHandle, SessionProvider, SessionSpec};
use crate::config::TmuxSettings;
use crate::error::{Error, Result};

/// User option carrying the configured icon on each window
pub const ICON_OPTION: &str = "@termlaunch-icon";

const WINDOW_ID_FORMAT: &str = "#{window_id}";
const LIST_FORMAT: &str = "#{window_id}\t#{window_name}";

/// tmux-backed [`SessionProvider`]
#[derive(Debug, Clone)]
pub struct TmuxHost {
    program: String,
    session: String,
}

impl TmuxHost {
    pub fn new(settings: &TmuxSettings) -> Self {
        Self {
            program: settings.program.clone(),
            session: settings.session.clone(),
        }
    }

    /// Name of the tmux session holding the launched windows
    pub fn session(&self) -> &str {
        &self.session
    }

    /// Run tmux, returning stdout or the trimmed stderr as the failure reason
    async fn run(&self, args: &[String]) -> std::result::Result<String, String> {
        debug!("{} {}", self.program, args.join(" "));

        let output = Command::new(&self.program)
            .args(args)
            .output()
            .await
            .map_err(|e| format!("failed to execute {}: {}", self.program, e))?;

        if output.status.success() {
            Ok(String::from_utf8_lossy(&output.stdout).into_owned())
        } else {
            Err(String::from_utf8_lossy(&output.stderr).trim().to_string())
        }
    }

    async fn has_session(&self) -> bool {
        self.run(&has_session_args(&self.session)).await.is_ok()
    }

    /// Apply color and icon; failures here never fail the creation
    async fn decorate(&self, window_id: &str, spec: &SessionSpec) {
        for args in decoration_args(window_id, spec) {
            if let Err(reason) = self.run(&args).await {
                warn!("Could not style window '{}': {}", spec.name, reason);
            }
        }
    }
}

#[async_trait]
impl SessionProvider for TmuxHost {
    async fn live_sessions(&self) -> Result<Vec<LiveSession>> {
        if !self.has_session().await {
            return Ok(Vec::new());
        }

        let stdout = self
            .run(&list_windows_args(&self.session))
            .await
            .map_err(|reason| Error::host("list-windows", reason))?;

        Ok(parse_window_list(&stdout))
    }

    async fn create(&self, spec: &SessionSpec) -> Result<SessionHandle> {
        let args = if self.has_session().await {
            new_window_args(&self.session, spec)
        } else {
            new_session_args(&self.session, spec)
        };

        let stdout = self.run(&args).await.map_err(|reason| Error::SessionCreation {
            name: spec.name.clone(),
            reason,
        })?;

        let id = stdout.trim().to_string();
        if id.is_empty() {
            return Err(Error::SessionCreation {
                name: spec.name.clone(),
                reason: "tmux did not report a window id".to_string(),
            });
        }

        self.decorate(&id, spec).await;

        Ok(SessionHandle {
            id,
            name: spec.name.clone(),
        })
    }

    async fn dispose(&self, id: &str) -> Result<()> {
        self.run(&kill_window_args(id))
            .await
            .map(|_| ())
            .map_err(|reason| Error::host("kill-window", reason))
    }

    async fn send_text(&self, id: &str, text: &str) -> Result<()> {
        for args in send_text_args(id, text) {
            self.run(&args)
                .await
                .map_err(|reason| Error::host("send-keys", reason))?;
        }
        Ok(())
    }
}

/// Exact-match check for the owning session
pub fn has_session_args(session: &str) -> Vec<String> {
    vec![
        "has-session".to_string(),
        "-t".to_string(),
        format!("={}", session),
    ]
}

pub fn list_windows_args(session: &str) -> Vec<String> {
    vec![
        "list-windows".to_string(),
        "-t".to_string(),
        format!("={}", session),
        "-F".to_string(),
        LIST_FORMAT.to_string(),
    ]
}

/// Create the owning session with its first window (always detached)
pub fn new_session_args(session: &str, spec: &SessionSpec) -> Vec<String> {
    let mut args = vec![
        "new-session".to_string(),
        "-d".to_string(),
        "-s".to_string(),
        session.to_string(),
    ];
    push_window_args(&mut args, spec);
    args
}

/// Append a window to the owning session
pub fn new_window_args(session: &str, spec: &SessionSpec) -> Vec<String> {
    let mut args = vec!["new-window".to_string()];
    if !spec.focus {
        args.push("-d".to_string());
    }
    args.push("-t".to_string());
    args.push(format!("={}:", session));
    push_window_args(&mut args, spec);
    args
}

/// Name, id report, cwd, env and shell command shared by both creation forms
fn push_window_args(args: &mut Vec<String>, spec: &SessionSpec) {
    args.push("-n".to_string());
    args.push(spec.name.clone());
    args.push("-P".to_string());
    args.push("-F".to_string());
    args.push(WINDOW_ID_FORMAT.to_string());

    if let Some(cwd) = &spec.cwd {
        args.push("-c".to_string());
        args.push(cwd.display().to_string());
    }

    let mut env: Vec<_> = spec.env.iter().collect();
    env.sort();
    for (key, value) in env {
        args.push("-e".to_string());
        args.push(format!("{}={}", key, value));
    }

    if let Some(shell) = &spec.shell_path {
        args.push(shell.display().to_string());
        args.extend(spec.shell_args.iter().cloned());
    }
}

/// `set-option` invocations for the window's color and icon
pub fn decoration_args(window_id: &str, spec: &SessionSpec) -> Vec<Vec<String>> {
    let set = |option: &str, value: String| {
        vec![
            "set-option".to_string(),
            "-w".to_string(),
            "-t".to_string(),
            window_id.to_string(),
            option.to_string(),
            value,
        ]
    };

    let mut commands = Vec::new();
    if let Some(color) = spec.color {
        let style = format!("fg={}", color.ansi_name());
        commands.push(set("window-status-style", style.clone()));
        commands.push(set("window-status-current-style", format!("{},bold", style)));
    }
    if let Some(icon) = &spec.icon {
        commands.push(set(ICON_OPTION, icon.clone()));
    }
    commands
}

pub fn kill_window_args(window_id: &str) -> Vec<String> {
    vec![
        "kill-window".to_string(),
        "-t".to_string(),
        window_id.to_string(),
    ]
}

/// Literal text, then Enter as a separate key
pub fn send_text_args(window_id: &str, text: &str) -> Vec<Vec<String>> {
    vec![
        vec![
            "send-keys".to_string(),
            "-t".to_string(),
            window_id.to_string(),
            "-l".to_string(),
            "--".to_string(),
            text.to_string(),
        ],
        vec![
            "send-keys".to_string(),
            "-t".to_string(),
            window_id.to_string(),
            "Enter".to_string(),
        ],
    ]
}

/// Parse `list-windows` output in [`LIST_FORMAT`]
pub fn parse_window_list(stdout: &str) -> Vec<LiveSession> {
    stdout
        .lines()
        .filter_map(|line| {
            let (id, name) = line.split_once('\t')?;
            Some(LiveSession {
                id: id.to_string(),
                name: name.to_string(),
            })
        })
        .collect()
}
