//! User prompts
//!
//! The orchestrator and the command surface ask three kinds of questions:
//! how to handle name collisions, which config to launch, and plain yes/no
//! confirmations. [`StdinPrompt`] asks on the terminal; [`ScriptedPrompt`]
//! answers from a pre-seeded script and records what was asked.

use std::collections::VecDeque;
use std::fmt;
use std::io::{self, BufRead, IsTerminal, Write};
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::{Mutex, MutexGuard, PoisonError};

use tracing::warn;

/// How to treat requests whose name is already live
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConflictPolicy {
    /// Close the live session, then create under the same name
    Replace,
    /// Leave the live session alone and create nothing
    Skip,
    /// Create under the next free `"name (N)"`
    Rename,
    /// Abort the whole batch before anything is created
    Cancel,
}

impl ConflictPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConflictPolicy::Replace => "replace",
            ConflictPolicy::Skip => "skip",
            ConflictPolicy::Rename => "rename",
            ConflictPolicy::Cancel => "cancel",
        }
    }
}

impl fmt::Display for ConflictPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ConflictPolicy {
    type Err = String;

    /// Accepts the full word or its first letter; `n` ("new name") also
    /// means rename
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "replace" | "r" => Ok(ConflictPolicy::Replace),
            "skip" | "s" => Ok(ConflictPolicy::Skip),
            "rename" | "n" => Ok(ConflictPolicy::Rename),
            "cancel" | "c" => Ok(ConflictPolicy::Cancel),
            other => Err(format!("unknown conflict policy '{}'", other)),
        }
    }
}

pub trait PromptProvider: Send + Sync {
    /// Pick one policy for every colliding name in a batch
    fn choose_conflict_policy(&self, conflicting: &[String]) -> ConflictPolicy;

    /// Pick one of several config files; `None` cancels
    fn select_config(&self, candidates: &[PathBuf]) -> Option<usize>;

    fn confirm(&self, question: &str) -> bool;
}

/// Interactive prompts on stdin/stdout.
///
/// When stdin is not a terminal nothing is read: conflicts cancel,
/// selections cancel and confirmations are declined.
#[derive(Debug, Default)]
pub struct StdinPrompt;

impl StdinPrompt {
    pub fn new() -> Self {
        Self
    }

    fn ask(&self, question: &str) -> Option<String> {
        if !io::stdin().is_terminal() {
            warn!("Cannot prompt, stdin is not a TTY: {}", question.trim());
            return None;
        }

        print!("{}", question);
        io::stdout().flush().ok()?;

        let mut response = String::new();
        match io::stdin().lock().read_line(&mut response) {
            Ok(0) | Err(_) => None,
            Ok(_) => Some(response),
        }
    }
}

impl PromptProvider for StdinPrompt {
    fn choose_conflict_policy(&self, conflicting: &[String]) -> ConflictPolicy {
        println!("These terminals are already open:");
        for name in conflicting {
            println!("  - {}", name);
        }

        loop {
            let Some(answer) = self.ask("[r]eplace, [s]kip, [n]ew name or [c]ancel? ") else {
                return ConflictPolicy::Cancel;
            };
            match answer.parse() {
                Ok(policy) => return policy,
                Err(e) => println!("{}", e),
            }
        }
    }

    fn select_config(&self, candidates: &[PathBuf]) -> Option<usize> {
        println!("Several terminal configurations were found:");
        for (i, path) in candidates.iter().enumerate() {
            println!("  {}) {}", i + 1, path.display());
        }

        let answer = self.ask(&format!("Launch which one? [1-{}] ", candidates.len()))?;
        parse_selection(&answer, candidates.len())
    }

    fn confirm(&self, question: &str) -> bool {
        self.ask(&format!("{} [y/N] ", question))
            .map(|answer| parse_confirmation(&answer))
            .unwrap_or(false)
    }
}

/// 1-based menu answer to a 0-based index
pub fn parse_selection(answer: &str, count: usize) -> Option<usize> {
    answer
        .trim()
        .parse::<usize>()
        .ok()
        .filter(|n| (1..=count).contains(n))
        .map(|n| n - 1)
}

pub fn parse_confirmation(answer: &str) -> bool {
    matches!(answer.trim().to_lowercase().as_str(), "y" | "yes")
}

/// A question put to a [`ScriptedPrompt`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PromptRecord {
    Conflict(Vec<String>),
    Select(Vec<PathBuf>),
    Confirm(String),
}

/// Prompts answered from queued responses.
///
/// Once a queue runs dry the fallback answer is used: the fallback policy
/// (cancel unless set), no selection, and a declined confirmation.
#[derive(Debug)]
pub struct ScriptedPrompt {
    policies: Mutex<VecDeque<ConflictPolicy>>,
    selections: Mutex<VecDeque<Option<usize>>>,
    confirmations: Mutex<VecDeque<bool>>,
    fallback_policy: ConflictPolicy,
    asked: Mutex<Vec<PromptRecord>>,
}

impl Default for ScriptedPrompt {
    fn default() -> Self {
        Self {
            policies: Mutex::new(VecDeque::new()),
            selections: Mutex::new(VecDeque::new()),
            confirmations: Mutex::new(VecDeque::new()),
            fallback_policy: ConflictPolicy::Cancel,
            asked: Mutex::new(Vec::new()),
        }
    }
}

impl ScriptedPrompt {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer every conflict question with `policy`
    pub fn always(policy: ConflictPolicy) -> Self {
        Self {
            fallback_policy: policy,
            ..Self::default()
        }
    }

    pub fn with_policy(self, policy: ConflictPolicy) -> Self {
        lock(&self.policies).push_back(policy);
        self
    }

    pub fn with_selection(self, selection: Option<usize>) -> Self {
        lock(&self.selections).push_back(selection);
        self
    }

    pub fn with_confirmation(self, answer: bool) -> Self {
        lock(&self.confirmations).push_back(answer);
        self
    }

    /// Every question asked so far, in order
    pub fn asked(&self) -> Vec<PromptRecord> {
        lock(&self.asked).clone()
    }

    /// Number of conflict questions asked so far
    pub fn conflict_prompts(&self) -> usize {
        lock(&self.asked)
            .iter()
            .filter(|r| matches!(r, PromptRecord::Conflict(_)))
            .count()
    }
}

impl PromptProvider for ScriptedPrompt {
    fn choose_conflict_policy(&self, conflicting: &[String]) -> ConflictPolicy {
        lock(&self.asked).push(PromptRecord::Conflict(conflicting.to_vec()));
        lock(&self.policies)
            .pop_front()
            .unwrap_or(self.fallback_policy)
    }

    fn select_config(&self, candidates: &[PathBuf]) -> Option<usize> {
        lock(&self.asked).push(PromptRecord::Select(candidates.to_vec()));
        lock(&self.selections)
            .pop_front()
            .flatten()
            .filter(|i| *i < candidates.len())
    }

    fn confirm(&self, question: &str) -> bool {
        lock(&self.asked).push(PromptRecord::Confirm(question.to_string()));
        lock(&self.confirmations).pop_front().unwrap_or(false)
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
