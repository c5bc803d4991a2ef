//! Launch outcomes
//!
//! Result taxonomy of one orchestration call, plus the per-request failures
//! collected while a batch runs.

use std::fmt;

use crate::error::Error;

/// A single request that failed without halting its batch
#[derive(Debug)]
pub struct RequestFailure {
    /// Effective name of the request (or config path for project-level failures)
    pub name: String,
    pub error: Error,
}

impl fmt::Display for RequestFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.name, self.error)
    }
}

/// What one orchestration call did
#[derive(Debug)]
pub enum LaunchOutcome {
    /// Every request was created or deliberately skipped
    Success { created: usize },
    /// Some requests failed; the rest completed
    PartialFailure {
        created: usize,
        failures: Vec<RequestFailure>,
    },
    NoConfigFound,
    /// The user aborted at a prompt
    UserCancelled,
    ParseError(String),
}

impl LaunchOutcome {
    /// Build `Success` or `PartialFailure` from a finished batch
    pub fn from_batch(created: usize, failures: Vec<RequestFailure>) -> Self {
        if failures.is_empty() {
            LaunchOutcome::Success { created }
        } else {
            LaunchOutcome::PartialFailure { created, failures }
        }
    }

    /// Number of sessions created
    pub fn created(&self) -> usize {
        match self {
            LaunchOutcome::Success { created } | LaunchOutcome::PartialFailure { created, .. } => {
                *created
            }
            _ => 0,
        }
    }

    pub fn failures(&self) -> &[RequestFailure] {
        match self {
            LaunchOutcome::PartialFailure { failures, .. } => failures,
            _ => &[],
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, LaunchOutcome::Success { .. })
    }

    /// One aggregate, human-readable report of the outcome
    pub fn summary(&self) -> String {
        match self {
            LaunchOutcome::Success { created } => {
                format!("Launched {} terminal{}", created, plural(*created))
            }
            LaunchOutcome::PartialFailure { created, failures } => {
                let mut out = format!(
                    "Launched {} terminal{}, {} failed:",
                    created,
                    plural(*created),
                    failures.len()
                );
                for failure in failures {
                    out.push_str("\n  - ");
                    out.push_str(&failure.to_string());
                }
                out
            }
            LaunchOutcome::NoConfigFound => "No terminal configuration found".to_string(),
            LaunchOutcome::UserCancelled => "Launch cancelled".to_string(),
            LaunchOutcome::ParseError(detail) => {
                format!("Could not read configuration: {}", detail)
            }
        }
    }
}

fn plural(count: usize) -> &'static str {
    if count == 1 {
        ""
    } else {
        "s"
    }
}
