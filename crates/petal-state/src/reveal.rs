//! Reveal Sequencer - one timed overlay reveal per dispersed excursion
//!
//! # Phases
//!
//! - `Idle`: nothing scheduled. Entered on every gathered reset.
//! - `Pending`: dispersed and not selecting; the pending deadline is armed.
//! - `Shown`: the pending deadline elapsed with the gate still open; the
//!   overlay is visible and the hide deadline is armed.
//! - `Hidden`: the reveal for this cycle is over (expired or interrupted by a
//!   selection). Only a gathered reset leaves it.
//!
//! All deadlines live here and every input goes through [`RevealSequencer::transition`],
//! which first fires whatever is already due. A deadline that has been
//! cancelled can therefore never act on a superseded state.

use std::time::Duration;

use petal_core::{InteractionState, Mode, MonoTime};
use petal_time::Deadline;

/// Reveal phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum RevealPhase {
    #[default]
    Idle,
    Pending,
    Shown,
    Hidden,
}

impl RevealPhase {
    pub fn is_visible(self) -> bool {
        self == RevealPhase::Shown
    }
}

/// Sequencer configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RevealConfig {
    /// Uninterrupted free time before the overlay shows
    pub pending_delay: Duration,
    /// How long the overlay stays up without interruption
    pub shown_duration: Duration,
}

impl Default for RevealConfig {
    fn default() -> Self {
        Self {
            pending_delay: Duration::from_millis(2000),
            shown_duration: Duration::from_millis(8000),
        }
    }
}

/// Input to the sequencer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RevealInput {
    /// Latest interaction gate
    Gate { mode: Mode, selection_active: bool },
    /// Time passed; fire due deadlines only
    Tick,
    /// Teardown: cancel everything and stop
    Shutdown,
}

impl RevealInput {
    pub fn gate(state: &InteractionState) -> Self {
        RevealInput::Gate {
            mode: state.mode,
            selection_active: state.selection_active,
        }
    }
}

/// Why a phase transition happened
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RevealCause {
    /// Gate opened; pending deadline armed
    Scheduled,
    /// Gate closed before the pending deadline
    Cancelled,
    /// Pending deadline elapsed
    Elapsed,
    /// Shown duration elapsed
    Expired,
    /// Selection started while shown
    Interrupted,
    /// Gathered reset
    Reset,
    /// Teardown
    Shutdown,
}

/// One phase transition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RevealTransition {
    pub from: RevealPhase,
    pub to: RevealPhase,
    pub cause: RevealCause,
    /// Logical time of the transition (the scheduled time for deadline firings)
    pub at: MonoTime,
}

impl RevealTransition {
    /// Overlay visibility after this transition
    pub fn visible(&self) -> bool {
        self.to.is_visible()
    }
}

/// Multi-stage reveal timer state machine
#[derive(Debug, Clone)]
pub struct RevealSequencer {
    config: RevealConfig,
    phase: RevealPhase,
    shown_this_cycle: bool,
    pending: Deadline,
    hide: Deadline,
    /// Last gate seen, re-checked when the pending deadline fires
    mode: Mode,
    selection_active: bool,
    shut_down: bool,
}

impl RevealSequencer {
    pub fn new(config: RevealConfig) -> Self {
        Self {
            config,
            phase: RevealPhase::Idle,
            shown_this_cycle: false,
            pending: Deadline::new(),
            hide: Deadline::new(),
            mode: Mode::Gathered,
            selection_active: false,
            shut_down: false,
        }
    }

    pub fn phase(&self) -> RevealPhase {
        self.phase
    }

    pub fn is_visible(&self) -> bool {
        self.phase.is_visible()
    }

    pub fn shown_this_cycle(&self) -> bool {
        self.shown_this_cycle
    }

    pub fn is_shut_down(&self) -> bool {
        self.shut_down
    }

    pub fn config(&self) -> &RevealConfig {
        &self.config
    }

    /// Earliest armed deadline, for the scheduler
    pub fn next_deadline(&self) -> Option<MonoTime> {
        match (self.pending.due(), self.hide.due()) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    /// Single entry point. Fires due deadlines, then applies `input`.
    /// Returns every phase transition caused, in order.
    pub fn transition(&mut self, now: MonoTime, input: RevealInput) -> Vec<RevealTransition> {
        let mut out = Vec::new();
        if self.shut_down {
            return out;
        }

        self.fire_due(now, &mut out);

        match input {
            RevealInput::Tick => {}
            RevealInput::Gate {
                mode,
                selection_active,
            } => {
                self.mode = mode;
                self.selection_active = selection_active;
                self.apply_gate(now, &mut out);
            }
            RevealInput::Shutdown => {
                self.pending.cancel();
                self.hide.cancel();
                self.move_to(RevealPhase::Idle, RevealCause::Shutdown, now, &mut out);
                self.shut_down = true;
            }
        }

        out
    }

    fn gate_open(&self) -> bool {
        self.mode.is_dispersed() && !self.selection_active
    }

    fn apply_gate(&mut self, now: MonoTime, out: &mut Vec<RevealTransition>) {
        if self.mode == Mode::Gathered {
            self.pending.cancel();
            self.hide.cancel();
            self.shown_this_cycle = false;
            self.move_to(RevealPhase::Idle, RevealCause::Reset, now, out);
            return;
        }

        if self.gate_open() {
            if !self.shown_this_cycle
                && !self.pending.is_armed()
                && self.phase != RevealPhase::Shown
            {
                self.pending.arm(now, self.config.pending_delay);
                self.move_to(RevealPhase::Pending, RevealCause::Scheduled, now, out);
            }
            return;
        }

        // Selecting
        if self.pending.cancel() {
            self.move_to(RevealPhase::Idle, RevealCause::Cancelled, now, out);
        }
        if self.phase == RevealPhase::Shown {
            self.hide.cancel();
            self.move_to(RevealPhase::Hidden, RevealCause::Interrupted, now, out);
        }
    }

    /// Fire due deadlines in chronological order
    fn fire_due(&mut self, now: MonoTime, out: &mut Vec<RevealTransition>) {
        if let Some(at) = self.pending.fire_if_due(now) {
            if self.gate_open() && !self.shown_this_cycle {
                self.shown_this_cycle = true;
                self.hide.arm(at, self.config.shown_duration);
                self.move_to(RevealPhase::Shown, RevealCause::Elapsed, at, out);
            } else {
                self.move_to(RevealPhase::Idle, RevealCause::Cancelled, at, out);
            }
        }

        if let Some(at) = self.hide.fire_if_due(now) {
            if self.phase == RevealPhase::Shown {
                self.move_to(RevealPhase::Hidden, RevealCause::Expired, at, out);
            }
        }
    }

    fn move_to(
        &mut self,
        to: RevealPhase,
        cause: RevealCause,
        at: MonoTime,
        out: &mut Vec<RevealTransition>,
    ) {
        if self.phase == to {
            return;
        }
        let from = self.phase;
        self.phase = to;
        tracing::debug!(?from, ?to, ?cause, ?at, "reveal transition");
        out.push(RevealTransition {
            from,
            to,
            cause,
            at,
        });
    }
}

impl Default for RevealSequencer {
    fn default() -> Self {
        Self::new(RevealConfig::default())
    }
}
