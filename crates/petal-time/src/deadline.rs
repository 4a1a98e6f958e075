//! Deadline - a cancellable one-shot timer slot
//!
//! A `Deadline` has exactly one owner. Re-arming replaces the previous
//! schedule, cancelling is idempotent, and a deadline fires at most once per
//! arming. Each arming gets a fresh generation, so a [`DeadlineToken`] handed
//! to an external timer backend goes stale the moment the owner re-arms or
//! cancels.

use std::time::Duration;

use petal_core::MonoTime;

/// Identifies one arming of a [`Deadline`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DeadlineToken {
    generation: u64,
    at: MonoTime,
}

impl DeadlineToken {
    /// When this arming is due
    pub fn at(&self) -> MonoTime {
        self.at
    }
}

/// Cancellable one-shot deadline
#[derive(Debug, Clone, Default)]
pub struct Deadline {
    /// Due time of the current arming, if armed
    due: Option<MonoTime>,
    /// Bumped on every arm and cancel
    generation: u64,
}

impl Deadline {
    /// Create an unarmed deadline
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedule `delay` after `now`, replacing any previous schedule
    pub fn arm(&mut self, now: MonoTime, delay: Duration) -> DeadlineToken {
        self.arm_at(now.saturating_add(delay))
    }

    /// Schedule at an absolute time, replacing any previous schedule
    pub fn arm_at(&mut self, at: MonoTime) -> DeadlineToken {
        self.generation = self.generation.wrapping_add(1);
        self.due = Some(at);
        DeadlineToken {
            generation: self.generation,
            at,
        }
    }

    /// Cancel the current arming. Returns true if something was cancelled;
    /// cancelling an unarmed or already fired deadline is a no-op.
    pub fn cancel(&mut self) -> bool {
        if self.due.take().is_some() {
            self.generation = self.generation.wrapping_add(1);
            true
        } else {
            false
        }
    }

    pub fn is_armed(&self) -> bool {
        self.due.is_some()
    }

    /// Due time of the current arming
    pub fn due(&self) -> Option<MonoTime> {
        self.due
    }

    /// Is the current arming due at `now`?
    pub fn is_due(&self, now: MonoTime) -> bool {
        matches!(self.due, Some(at) if at <= now)
    }

    /// Fire if due. Returns the scheduled time of the arming that fired.
    pub fn fire_if_due(&mut self, now: MonoTime) -> Option<MonoTime> {
        if self.is_due(now) {
            self.due.take()
        } else {
            None
        }
    }

    /// Fire on behalf of an external timer. Only the token of the current
    /// arming is honoured; stale tokens are ignored.
    pub fn fire_token(&mut self, token: DeadlineToken) -> Option<MonoTime> {
        if self.generation == token.generation && self.due == Some(token.at) {
            self.due.take()
        } else {
            None
        }
    }
}
