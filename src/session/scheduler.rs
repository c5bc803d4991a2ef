//! Scheduled text injections
//!
//! Each created session gets its command text queued at an absolute time on
//! the orchestrator's clock. The queue is drained in due order, ties broken
//! by scheduling order.

use std::time::Duration;

/// One line of text owed to a session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dispatch {
    pub due: Duration,
    pub session_id: String,
    /// Session name, for logging
    pub session_name: String,
    pub text: String,
    seq: u64,
}

#[derive(Debug, Default)]
pub struct DispatchQueue {
    pending: Vec<Dispatch>,
    next_seq: u64,
}

impl DispatchQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schedule(
        &mut self,
        due: Duration,
        session_id: impl Into<String>,
        session_name: impl Into<String>,
        text: impl Into<String>,
    ) {
        let dispatch = Dispatch {
            due,
            session_id: session_id.into(),
            session_name: session_name.into(),
            text: text.into(),
            seq: self.next_seq,
        };
        self.next_seq += 1;

        let at = self
            .pending
            .partition_point(|d| (d.due, d.seq) <= (dispatch.due, dispatch.seq));
        self.pending.insert(at, dispatch);
    }

    /// Remove and return every dispatch due at or before `now`, in order
    pub fn take_due(&mut self, now: Duration) -> Vec<Dispatch> {
        let split = self.pending.partition_point(|d| d.due <= now);
        self.pending.drain(..split).collect()
    }

    /// Remove and return the earliest dispatch
    pub fn pop_next(&mut self) -> Option<Dispatch> {
        if self.pending.is_empty() {
            None
        } else {
            Some(self.pending.remove(0))
        }
    }

    /// Due time of the earliest dispatch
    pub fn next_due(&self) -> Option<Duration> {
        self.pending.first().map(|d| d.due)
    }

    /// Drop everything queued for one session
    pub fn cancel_session(&mut self, session_id: &str) {
        self.pending.retain(|d| d.session_id != session_id);
    }

    pub fn clear(&mut self) {
        self.pending.clear();
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}
