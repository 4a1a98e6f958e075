//! Controller - the single owner of all interaction state
//!
//! Detector frames, external toggles and timer polls all enter through
//! `&mut self`, so frame-driven and deadline-driven mutations can never
//! interleave. Every call first fires whatever deadlines are already due, in
//! chronological order, and only then applies its own input.

use std::collections::VecDeque;

use petal_core::{HandFrame, InteractionState, MonoTime, PetalResult, Point3};
use petal_gesture::{Observation, PoseClassifier};
use petal_state::{
    FrameOutcome, InteractionMachine, RevealInput, RevealPhase, RevealSequencer, RevealTransition,
};
use petal_time::{Clock, SystemClock};

use crate::{DetectorStatus, Emission, OverlayPresenter, RuntimeConfig};

/// One detector callback
#[derive(Debug, Clone, PartialEq)]
pub enum Detection {
    Hand(HandFrame),
    NoHand,
}

impl From<Option<HandFrame>> for Detection {
    fn from(frame: Option<HandFrame>) -> Self {
        match frame {
            Some(frame) => Detection::Hand(frame),
            None => Detection::NoHand,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RuntimeStats {
    /// Detector callbacks processed (hand or not)
    pub frames: u64,
    pub no_hand_frames: u64,
    /// Landmark sets rejected and treated as no hand
    pub malformed_frames: u64,
    pub toggles: u64,
    pub mode_changes: u64,
    pub reveals_shown: u64,
}

/// Point-in-time view for renderers
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Snapshot {
    pub state: InteractionState,
    pub reveal_phase: RevealPhase,
    pub overlay_visible: bool,
    pub content_visible: bool,
    pub detector: DetectorStatus,
    pub at: MonoTime,
}

/// Frame-driven interaction controller
pub struct Controller<C: Clock = SystemClock> {
    clock: C,
    classifier: PoseClassifier,
    machine: InteractionMachine,
    sequencer: RevealSequencer,
    overlay: OverlayPresenter,
    detector: DetectorStatus,
    /// Pending emissions
    outbox: VecDeque<Emission>,
    stats: RuntimeStats,
    shut_down: bool,
}

impl<C: Clock> Controller<C> {
    /// Build a controller from a validated configuration
    pub fn new(config: &RuntimeConfig, clock: C) -> PetalResult<Self> {
        config.validate()?;

        let mode = config.mode()?;
        let machine = match config.rng_seed {
            Some(seed) => InteractionMachine::seeded(mode, seed),
            None => InteractionMachine::new(mode),
        };

        Ok(Self {
            clock,
            classifier: PoseClassifier::new(config.classifier()),
            machine,
            sequencer: RevealSequencer::new(config.reveal()),
            overlay: OverlayPresenter::new(config.overlay()),
            detector: DetectorStatus::Starting,
            outbox: VecDeque::new(),
            stats: RuntimeStats::default(),
            shut_down: false,
        })
    }

    /// Process one detector callback
    pub fn ingest(&mut self, detection: Detection) {
        if self.shut_down {
            return;
        }
        let now = self.clock.now();
        self.advance(now);

        let observation = match &detection {
            Detection::Hand(frame) => self.classifier.observe(Some(frame)),
            Detection::NoHand => Observation::NoHand,
        };

        self.stats.frames += 1;
        if matches!(observation, Observation::NoHand) {
            self.stats.no_hand_frames += 1;
        }

        let outcome = self.machine.observe(&observation);
        self.apply(now, outcome);
    }

    /// Process raw detector landmarks. An empty set means no hand; a set
    /// that cannot form a hand frame is logged and treated as no hand.
    pub fn ingest_points(&mut self, points: &[Point3]) {
        if self.shut_down {
            return;
        }
        if points.is_empty() {
            self.ingest(Detection::NoHand);
            return;
        }

        match HandFrame::from_points(points) {
            Ok(frame) => self.ingest(Detection::Hand(frame)),
            Err(e) => {
                tracing::warn!(error = %e, "dropping malformed landmark set");
                self.stats.malformed_frames += 1;
                self.ingest(Detection::NoHand);
            }
        }
    }

    /// External toggle (click): flips the mode unconditionally
    pub fn toggle(&mut self) {
        if self.shut_down {
            return;
        }
        let now = self.clock.now();
        self.advance(now);

        self.stats.toggles += 1;
        let outcome = self.machine.toggle();
        self.apply(now, outcome);
    }

    /// Fire every deadline that is due now
    pub fn poll_timers(&mut self) {
        if self.shut_down {
            return;
        }
        let now = self.clock.now();
        self.advance(now);
    }

    /// Earliest armed deadline; `None` when nothing is scheduled
    pub fn next_deadline(&self) -> Option<MonoTime> {
        if self.shut_down {
            return None;
        }
        match (self.sequencer.next_deadline(), self.overlay.next_deadline()) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    /// Record a detector status change. An unavailable detector feeds no-hand
    /// frames until the selection has decayed, since no more frames will come.
    pub fn set_detector_status(&mut self, status: DetectorStatus) {
        if self.shut_down || status == self.detector {
            return;
        }

        match &status {
            DetectorStatus::Unavailable(reason) => {
                tracing::warn!(%reason, "detector unavailable");
            }
            DetectorStatus::Online => tracing::info!("detector online"),
            DetectorStatus::Starting => tracing::debug!("detector starting"),
        }

        self.detector = status.clone();
        self.outbox.push_back(Emission::DetectorStatus(status));

        if self.detector.is_unavailable() {
            self.ingest(Detection::NoHand);
            let mut budget = self.machine.stabilizer().config().ceiling();
            while self.machine.state().selection_active && budget > 0 {
                self.ingest(Detection::NoHand);
                budget -= 1;
            }
        }
    }

    /// Cancel every deadline and hide the overlay. Later input is ignored.
    pub fn shutdown(&mut self) {
        if self.shut_down {
            return;
        }
        let now = self.clock.now();
        self.advance(now);

        for transition in self.sequencer.transition(now, RevealInput::Shutdown) {
            self.on_reveal(transition);
        }
        if let Some(visible) = self.overlay.shutdown() {
            self.outbox.push_back(Emission::OverlayContent { visible });
        }

        self.shut_down = true;
        tracing::info!(frames = self.stats.frames, "controller shut down");
    }

    /// Take all pending emissions, oldest first
    pub fn drain(&mut self) -> Vec<Emission> {
        self.outbox.drain(..).collect()
    }

    /// Pop the oldest pending emission
    pub fn pop_emission(&mut self) -> Option<Emission> {
        self.outbox.pop_front()
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            state: self.machine.state().clone(),
            reveal_phase: self.sequencer.phase(),
            overlay_visible: self.overlay.is_overlay_visible(),
            content_visible: self.overlay.is_content_visible(),
            detector: self.detector.clone(),
            at: self.clock.now(),
        }
    }

    pub fn stats(&self) -> &RuntimeStats {
        &self.stats
    }

    pub fn state(&self) -> &InteractionState {
        self.machine.state()
    }

    pub fn reveal_phase(&self) -> RevealPhase {
        self.sequencer.phase()
    }

    /// Counter of the confidence stabilizer
    pub fn confidence(&self) -> u32 {
        self.machine.stabilizer().counter()
    }

    pub fn detector_status(&self) -> &DetectorStatus {
        &self.detector
    }

    pub fn is_shut_down(&self) -> bool {
        self.shut_down
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// Fire due reveal and overlay deadlines in chronological order
    fn advance(&mut self, now: MonoTime) {
        for transition in self.sequencer.transition(now, RevealInput::Tick) {
            self.poll_overlay(transition.at);
            self.on_reveal(transition);
        }
        self.poll_overlay(now);
    }

    fn poll_overlay(&mut self, now: MonoTime) {
        if let Some(visible) = self.overlay.poll(now) {
            self.outbox.push_back(Emission::OverlayContent { visible });
        }
    }

    fn apply(&mut self, now: MonoTime, outcome: FrameOutcome) {
        if let Some(mode) = outcome.mode_change {
            self.stats.mode_changes += 1;
            self.outbox.push_back(Emission::ModeChanged { mode });
        }
        if let Some(orientation) = outcome.orientation {
            self.outbox.push_back(Emission::Orientation(orientation));
        }

        let gate = RevealInput::gate(&outcome.state);
        self.outbox.push_back(Emission::Interaction(outcome.state));

        for transition in self.sequencer.transition(now, gate) {
            self.on_reveal(transition);
        }
    }

    fn on_reveal(&mut self, transition: RevealTransition) {
        let visible = transition.visible();
        if transition.to == RevealPhase::Shown {
            self.stats.reveals_shown += 1;
        }
        self.outbox.push_back(Emission::RevealVisibility { visible });

        if let Some(content) = self.overlay.set_overlay_visible(visible, transition.at) {
            self.outbox.push_back(Emission::OverlayContent { visible: content });
        }
    }
}
