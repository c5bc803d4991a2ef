//! Session Orchestrator
//!
//! Turns a launcher config into host sessions. One call to
//! [`Orchestrator::launch`] is one batch:
//!
//! 1. flatten groups (or the ungrouped list) into requests, in order;
//! 2. compute effective names and compare them against one snapshot of the
//!    live sessions;
//! 3. on any collision, ask once for a batch-wide [`ConflictPolicy`];
//! 4. create sessions one by one, isolating per-request failures;
//! 5. queue each session's command text on the clock.
//!
//! Queued text is delivered by [`Orchestrator::run_dispatches`], or while a
//! group stagger is waited out.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, info_span, warn, Instrument};
use uuid::Uuid;

use super::clock::Clock;
use super::naming::{effective_name, next_free_name};
use super::paths;
use super::prompt::{ConflictPolicy, PromptProvider};
use super::provider::{LiveSession, SessionHandle, SessionProvider, SessionSpec};
use super::scheduler::DispatchQueue;
use crate::error::{Error, Result};
use crate::models::{
    CommandSource, LaunchOutcome, RequestFailure, TerminalConfig, TerminalLauncherConfig,
    DEFAULT_COMMAND_DELAY_MS,
};

/// Timing constants applied to every batch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LaunchTiming {
    /// Wait after creation before the first text is sent
    pub grace_period: Duration,
    /// Spacing between consecutive creations inside one group
    pub group_stagger: Duration,
    /// Spacing between `commands` entries when a terminal sets no delay
    pub default_command_delay: Duration,
}

impl Default for LaunchTiming {
    fn default() -> Self {
        Self {
            grace_period: Duration::from_millis(500),
            group_stagger: Duration::from_millis(200),
            default_command_delay: Duration::from_millis(DEFAULT_COMMAND_DELAY_MS),
        }
    }
}

/// A run of terminals created together
struct Batch<'a> {
    terminals: &'a [TerminalConfig],
    staggered: bool,
}

/// State carried across the requests of one batch
struct BatchState {
    policy: Option<ConflictPolicy>,
    live: Vec<LiveSession>,
    live_names: HashSet<String>,
    /// Names a rename must avoid: every requested name plus every name
    /// created so far
    reserved_names: HashSet<String>,
    disposed_ids: HashSet<String>,
    created: usize,
    failures: Vec<RequestFailure>,
}

impl BatchState {
    fn collides(&self, name: &str) -> bool {
        self.live_names.contains(name)
    }
}

pub struct Orchestrator {
    host: Arc<dyn SessionProvider>,
    prompt: Arc<dyn PromptProvider>,
    clock: Arc<dyn Clock>,
    timing: LaunchTiming,
    workspace_roots: Vec<PathBuf>,
    /// Sessions this orchestrator created and still owns
    tracked: Vec<SessionHandle>,
    queue: DispatchQueue,
}

impl Orchestrator {
    pub fn new(
        host: Arc<dyn SessionProvider>,
        prompt: Arc<dyn PromptProvider>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            host,
            prompt,
            clock,
            timing: LaunchTiming::default(),
            workspace_roots: Vec::new(),
            tracked: Vec::new(),
            queue: DispatchQueue::new(),
        }
    }

    pub fn with_timing(mut self, timing: LaunchTiming) -> Self {
        self.timing = timing;
        self
    }

    /// Roots used for relative paths when a batch has no base path; the
    /// first one wins
    pub fn with_workspace_roots(mut self, roots: Vec<PathBuf>) -> Self {
        self.workspace_roots = roots;
        self
    }

    pub fn set_workspace_roots(&mut self, roots: Vec<PathBuf>) {
        self.workspace_roots = roots;
    }

    pub fn timing(&self) -> LaunchTiming {
        self.timing
    }

    pub fn tracked(&self) -> &[SessionHandle] {
        &self.tracked
    }

    /// Number of text injections still queued
    pub fn pending_dispatches(&self) -> usize {
        self.queue.len()
    }

    /// Launch every terminal of `config`.
    ///
    /// With a `base_path`, names get a `"[project] "` prefix and relative
    /// paths resolve against it.
    ///
    /// # Errors
    /// Only when the host's live sessions cannot be listed. Everything
    /// request-scoped is reported inside the outcome.
    pub async fn launch(
        &mut self,
        config: &TerminalLauncherConfig,
        base_path: Option<&Path>,
    ) -> Result<LaunchOutcome> {
        let span = info_span!("launch", batch = %Uuid::new_v4());
        self.launch_batch(config, base_path).instrument(span).await
    }

    async fn launch_batch(
        &mut self,
        config: &TerminalLauncherConfig,
        base_path: Option<&Path>,
    ) -> Result<LaunchOutcome> {
        let batches = flatten(config);
        let requested: Vec<String> = batches
            .iter()
            .flat_map(|b| b.terminals.iter())
            .map(|t| effective_name(&t.name, base_path))
            .collect();

        if requested.is_empty() {
            warn!("Configuration defines no terminals");
            return Ok(LaunchOutcome::Success { created: 0 });
        }

        let live = self.host.live_sessions().await?;
        let live_names: HashSet<String> = live.iter().map(|s| s.name.clone()).collect();

        let mut conflicting: Vec<String> = Vec::new();
        for name in &requested {
            if live_names.contains(name) && !conflicting.contains(name) {
                conflicting.push(name.clone());
            }
        }

        let policy = if conflicting.is_empty() {
            None
        } else {
            let policy = self.prompt.choose_conflict_policy(&conflicting);
            info!(
                "{} terminal name(s) already open, policy: {}",
                conflicting.len(),
                policy
            );
            if policy == ConflictPolicy::Cancel {
                return Ok(LaunchOutcome::UserCancelled);
            }
            Some(policy)
        };

        info!("Launching {} terminal(s)", requested.len());

        let mut state = BatchState {
            policy,
            live,
            live_names,
            reserved_names: requested.iter().cloned().collect(),
            disposed_ids: HashSet::new(),
            created: 0,
            failures: Vec::new(),
        };

        for batch in &batches {
            for (i, terminal) in batch.terminals.iter().enumerate() {
                if batch.staggered && i > 0 {
                    let deadline = self.clock.now() + self.timing.group_stagger;
                    self.advance_to(deadline).await;
                }

                let name = effective_name(&terminal.name, base_path);
                let launched = self
                    .launch_one(terminal, name.clone(), base_path, &mut state)
                    .await;
                if let Err(error) = launched {
                    warn!("Terminal '{}' failed: {}", name, error);
                    state.failures.push(RequestFailure { name, error });
                }
            }
        }

        info!(
            "Batch finished: {} created, {} failed",
            state.created,
            state.failures.len()
        );
        Ok(LaunchOutcome::from_batch(state.created, state.failures))
    }

    /// Create one request under the batch policy; `Ok` covers skips too
    async fn launch_one(
        &mut self,
        terminal: &TerminalConfig,
        name: String,
        base_path: Option<&Path>,
        state: &mut BatchState,
    ) -> Result<()> {
        let colliding = state.collides(&name);
        let name = match state.policy {
            Some(ConflictPolicy::Skip | ConflictPolicy::Cancel) if colliding => {
                debug!("Skipping '{}', already open", name);
                return Ok(());
            }
            Some(ConflictPolicy::Rename) if colliding => {
                let renamed = next_free_name(&name, &state.live_names, &state.reserved_names);
                debug!("Renaming '{}' to '{}'", name, renamed);
                renamed
            }
            _ => name,
        };

        let cwd = paths::resolve_cwd(terminal.cwd.as_deref(), base_path, &self.workspace_roots)?;
        let script = match terminal.command_source() {
            CommandSource::Script(script) => {
                Some(paths::resolve(script, base_path, &self.workspace_roots)?)
            }
            _ => None,
        };

        if colliding && state.policy == Some(ConflictPolicy::Replace) {
            self.replace_live(&name, state).await;
        }

        let spec = SessionSpec {
            name: name.clone(),
            cwd,
            env: terminal.env.clone(),
            shell_path: terminal.shell_path.clone(),
            shell_args: terminal.shell_args.clone().unwrap_or_default(),
            color: terminal.color.map(|c| c.to_host()),
            icon: terminal.icon.clone(),
            focus: state.created == 0,
        };

        let handle = self.host.create(&spec).await.map_err(|e| match e {
            Error::SessionCreation { .. } => e,
            other => Error::SessionCreation {
                name: name.clone(),
                reason: other.to_string(),
            },
        })?;

        debug!("Created '{}' as {}", handle.name, handle.id);
        self.schedule_commands(&handle, terminal, script.as_deref());
        state.created += 1;
        state.reserved_names.insert(name);
        self.tracked.push(handle);
        Ok(())
    }

    /// Dispose every snapshot session holding `name`, each at most once
    async fn replace_live(&mut self, name: &str, state: &mut BatchState) {
        let ids: Vec<String> = state
            .live
            .iter()
            .filter(|s| s.name == name && !state.disposed_ids.contains(&s.id))
            .map(|s| s.id.clone())
            .collect();

        for id in ids {
            debug!("Replacing '{}' ({})", name, id);
            if let Err(e) = self.host.dispose(&id).await {
                warn!("Could not close '{}' ({}): {}", name, id, e);
            }
            self.tracked.retain(|h| h.id != id);
            self.queue.cancel_session(&id);
            state.disposed_ids.insert(id);
        }
    }

    fn schedule_commands(
        &mut self,
        handle: &SessionHandle,
        terminal: &TerminalConfig,
        script: Option<&Path>,
    ) {
        let start = self.clock.now() + self.timing.grace_period;

        match terminal.command_source() {
            CommandSource::Script(_) => {
                if let Some(script) = script {
                    let text = script.display().to_string();
                    self.queue.schedule(start, &handle.id, &handle.name, text);
                }
            }
            CommandSource::Commands(commands) => {
                let default_ms = self.timing.default_command_delay.as_millis() as u64;
                let delay = Duration::from_millis(terminal.command_delay_or(default_ms));
                for (i, command) in commands.iter().enumerate() {
                    let due = start + delay * i as u32;
                    self.queue.schedule(due, &handle.id, &handle.name, command.as_str());
                }
            }
            CommandSource::Command(command) => {
                self.queue.schedule(start, &handle.id, &handle.name, command);
            }
            CommandSource::None => {}
        }
    }

    /// Wait until `deadline`, sending whatever falls due on the way
    async fn advance_to(&mut self, deadline: Duration) {
        while let Some(due) = self.queue.next_due().filter(|due| *due <= deadline) {
            self.clock.sleep_until(due).await;
            for dispatch in self.queue.take_due(due) {
                self.send(&dispatch.session_id, &dispatch.session_name, &dispatch.text)
                    .await;
            }
        }
        self.clock.sleep_until(deadline).await;
    }

    /// Send every queued injection in due order, sleeping until each is due
    pub async fn run_dispatches(&mut self) {
        while let Some(dispatch) = self.queue.pop_next() {
            self.clock.sleep_until(dispatch.due).await;
            self.send(&dispatch.session_id, &dispatch.session_name, &dispatch.text)
                .await;
        }
    }

    async fn send(&self, id: &str, name: &str, text: &str) {
        debug!("Sending to '{}': {}", name, text);
        if let Err(e) = self.host.send_text(id, text).await {
            warn!("Could not send text to '{}': {}", name, e);
        }
    }

    /// Close every tracked session and drop queued text. Returns how many
    /// sessions were released.
    pub async fn dispose_all(&mut self) -> usize {
        self.queue.clear();
        let handles: Vec<SessionHandle> = self.tracked.drain(..).collect();

        for handle in &handles {
            if let Err(e) = self.host.dispose(&handle.id).await {
                warn!("Could not close '{}': {}", handle.name, e);
            }
        }

        if !handles.is_empty() {
            info!("Closed {} terminal(s)", handles.len());
        }
        handles.len()
    }
}

/// Groups when any exist, otherwise the ungrouped list
fn flatten(config: &TerminalLauncherConfig) -> Vec<Batch<'_>> {
    let groups = config.groups();
    if groups.is_empty() {
        return vec![Batch {
            terminals: config.terminals(),
            staggered: false,
        }];
    }

    if !config.terminals().is_empty() {
        warn!(
            "Config has groups; ignoring {} ungrouped terminal(s)",
            config.terminals().len()
        );
    }

    groups
        .iter()
        .map(|group| Batch {
            terminals: &group.terminals,
            staggered: true,
        })
        .collect()
}
