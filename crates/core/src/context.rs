//! Cancellable, deadline-bearing call context.
//!
//! Every storage call receives the caller's `Context` unchanged. The engine
//! never extends a deadline and never retries a call that failed because of one.

use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};
use std::time::{Duration, Instant};

use crate::error::ContextError;

/// Context carried by a single logical operation.
///
/// Clones share the cancellation flag: cancelling any clone cancels all of them.
#[derive(Debug, Clone)]
pub struct Context {
    deadline: Option<Instant>,
    cancellation: Arc<AtomicBool>,
}

impl Context {
    /// A context with no deadline that is only cancelled explicitly.
    pub fn background() -> Self {
        Self {
            deadline: None,
            cancellation: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn with_timeout(timeout: Duration) -> Self {
        Self::with_deadline(Instant::now() + timeout)
    }

    pub fn with_deadline(deadline: Instant) -> Self {
        Self {
            deadline: Some(deadline),
            cancellation: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Derive a context that shares this one's cancellation and expires at the
    /// earlier of the parent deadline and `now + timeout`.
    pub fn child_with_timeout(&self, timeout: Duration) -> Self {
        let candidate = Instant::now() + timeout;
        let deadline = match self.deadline {
            Some(parent) if parent < candidate => parent,
            _ => candidate,
        };
        Self {
            deadline: Some(deadline),
            cancellation: self.cancellation.clone(),
        }
    }

    pub fn cancel(&self) {
        self.cancellation.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancellation.load(Ordering::Relaxed)
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Time left before the deadline; `None` when there is no deadline.
    pub fn remaining(&self) -> Option<Duration> {
        self.deadline
            .map(|d| d.saturating_duration_since(Instant::now()))
    }

    /// Fail fast if the context is cancelled or its deadline has passed.
    pub fn check(&self) -> Result<(), ContextError> {
        if self.is_cancelled() {
            return Err(ContextError::Cancelled);
        }
        match self.deadline {
            Some(deadline) if Instant::now() >= deadline => Err(ContextError::DeadlineExceeded),
            _ => Ok(()),
        }
    }
}

impl Default for Context {
    fn default() -> Self {
        Self::background()
    }
}
