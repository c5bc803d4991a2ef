//! Session orchestration
//!
//! The orchestrator and the seams it is driven through: the terminal host,
//! user prompts and the clock that paces creation and command dispatch.

pub mod clock;
pub mod naming;
pub mod orchestrator;
pub mod paths;
pub mod prompt;
pub mod provider;
pub mod scheduler;
pub mod tmux;

// Re-exports for convenience
pub use clock::{Clock, ManualClock, TokioClock};
pub use orchestrator::{LaunchTiming, Orchestrator};
pub use prompt::{ConflictPolicy, PromptProvider, PromptRecord, ScriptedPrompt, StdinPrompt};
pub use provider::{LiveSession, SessionHandle, SessionProvider, SessionSpec};
pub use scheduler::{Dispatch, DispatchQueue};
pub use tmux::TmuxHost;
