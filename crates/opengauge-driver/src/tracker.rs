//! Pending-request bookkeeping.

use std::time::{Duration, Instant};

/// Tracks whether a command is outstanding and until when a response is owed.
///
/// The instrument services one request at a time. A frame of any kind —
/// measurement, device info, status, even one that fails to decode —
/// completes whatever request is pending; there is no per-message-type slot.
#[derive(Debug, Default)]
pub struct RequestTracker {
    deadline: Option<Instant>,
}

impl RequestTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Arm the tracker for a command about to be sent.
    ///
    /// Returns `false` when a request is already awaiting its response; the
    /// new command must not be sent until the tracker returns to idle.
    #[must_use]
    pub fn begin(&mut self, now: Instant, timeout: Duration) -> bool {
        if self.deadline.is_some() {
            return false;
        }
        self.deadline = Some(now + timeout);
        true
    }

    /// Return to idle unconditionally.
    pub fn complete(&mut self) {
        self.deadline = None;
    }

    /// Expire the pending request once its deadline has passed.
    ///
    /// Reports the timeout at most once per armed request: the transition to
    /// idle and the report happen together, so later calls return `false`.
    #[must_use]
    pub fn check_timeout(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if now > deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }
}
