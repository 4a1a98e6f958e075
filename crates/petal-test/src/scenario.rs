//! Scenario Runner - scripted sessions on a manual clock
//!
//! Drives a [`Controller`] the way a real application would: frames arrive
//! at a fixed interval, deadlines are polled exactly when they fall due, and
//! every emission is recorded with the time it was produced. The recorded log
//! can then be checked against the interaction invariants.

use std::time::Duration;

use petal_core::{InteractionState, Mode, MonoTime, PetalResult};
use petal_runtime::{
    Controller, Detection, DetectorStatus, Emission, RuntimeConfig, RuntimeStats,
};
use petal_state::RevealPhase;
use petal_time::{Clock, ManualClock};

use crate::synthetic::{HandGenerator, HandGeneratorConfig, SyntheticPose};

/// One scripted step
#[derive(Debug, Clone, PartialEq)]
pub enum Step {
    /// One frame one interval from now
    Frame(SyntheticPose),
    /// Frames at the frame interval for this long
    Hold(SyntheticPose, Duration),
    /// One empty detection
    NoHand,
    /// One truncated landmark set
    Malformed,
    /// External toggle
    Toggle,
    /// Let time pass without frames
    Wait(Duration),
    Status(DetectorStatus),
    Shutdown,
}

/// An emission and when it was recorded
#[derive(Debug, Clone, PartialEq)]
pub struct TimedEmission {
    pub at: MonoTime,
    pub emission: Emission,
}

/// Runner configuration
#[derive(Clone, Debug)]
pub struct ScenarioConfig {
    pub runtime: RuntimeConfig,
    pub hands: HandGeneratorConfig,
    /// Spacing between frames (about 30 fps by default)
    pub frame_interval: Duration,
}

impl Default for ScenarioConfig {
    fn default() -> Self {
        ScenarioConfig {
            runtime: RuntimeConfig {
                rng_seed: Some(42),
                ..Default::default()
            },
            hands: HandGeneratorConfig::default(),
            frame_interval: Duration::from_millis(33),
        }
    }
}

/// Scripted session driver
pub struct ScenarioRunner {
    clock: ManualClock,
    controller: Controller<ManualClock>,
    hands: HandGenerator,
    frame_interval: Duration,
    log: Vec<TimedEmission>,
}

impl ScenarioRunner {
    pub fn new(config: ScenarioConfig) -> PetalResult<Self> {
        let clock = ManualClock::new();
        let controller = Controller::new(&config.runtime, clock.clone())?;

        Ok(ScenarioRunner {
            clock,
            controller,
            hands: HandGenerator::new(config.hands),
            frame_interval: config.frame_interval,
            log: Vec::new(),
        })
    }

    pub fn now(&self) -> MonoTime {
        self.clock.now()
    }

    /// Run steps in order
    pub fn run<I: IntoIterator<Item = Step>>(&mut self, steps: I) -> &mut Self {
        for step in steps {
            self.step(step);
        }
        self
    }

    pub fn step(&mut self, step: Step) -> &mut Self {
        match step {
            Step::Frame(pose) => self.frame(pose),
            Step::Hold(pose, duration) => self.hold(pose, duration),
            Step::NoHand => {
                self.wait(self.frame_interval);
                self.controller.ingest(Detection::NoHand);
                self.record();
            }
            Step::Malformed => {
                self.wait(self.frame_interval);
                let points = self.hands.malformed();
                self.controller.ingest_points(&points);
                self.record();
            }
            Step::Toggle => {
                self.controller.toggle();
                self.record();
            }
            Step::Wait(duration) => self.wait(duration),
            Step::Status(status) => {
                self.controller.set_detector_status(status);
                self.record();
            }
            Step::Shutdown => {
                self.controller.shutdown();
                self.record();
            }
        }
        self
    }

    /// Advance one frame interval, then deliver one frame
    pub fn frame(&mut self, pose: SyntheticPose) {
        self.wait(self.frame_interval);
        let detection = self.hands.detection(pose);
        self.controller.ingest(detection);
        self.record();
    }

    /// Deliver frames at the frame interval for `duration`
    pub fn hold(&mut self, pose: SyntheticPose, duration: Duration) {
        let end = self.now().saturating_add(duration);
        while self.now().saturating_add(self.frame_interval) <= end {
            self.frame(pose);
        }
        let now = self.now();
        self.wait(end.saturating_since(now));
    }

    /// Let time pass, polling each deadline exactly when it falls due
    pub fn wait(&mut self, duration: Duration) {
        let target = self.now().saturating_add(duration);
        while let Some(due) = self.controller.next_deadline() {
            if due > target {
                break;
            }
            self.clock.set(due);
            self.controller.poll_timers();
            self.record();
        }
        self.clock.set(target);
        self.controller.poll_timers();
        self.record();
    }

    fn record(&mut self) {
        let at = self.now();
        self.log.extend(
            self.controller
                .drain()
                .into_iter()
                .map(|emission| TimedEmission { at, emission }),
        );
    }

    pub fn controller(&self) -> &Controller<ManualClock> {
        &self.controller
    }

    pub fn state(&self) -> &InteractionState {
        self.controller.state()
    }

    pub fn phase(&self) -> RevealPhase {
        self.controller.reveal_phase()
    }

    pub fn stats(&self) -> &RuntimeStats {
        self.controller.stats()
    }

    pub fn log(&self) -> &[TimedEmission] {
        &self.log
    }

    pub fn hands(&mut self) -> &mut HandGenerator {
        &mut self.hands
    }

    /// Reveal visibility changes with their times
    pub fn reveal_log(&self) -> Vec<(MonoTime, bool)> {
        self.log
            .iter()
            .filter_map(|e| match e.emission {
                Emission::RevealVisibility { visible } => Some((e.at, visible)),
                _ => None,
            })
            .collect()
    }

    /// Times at which the overlay became visible
    pub fn reveal_times(&self) -> Vec<MonoTime> {
        let mut times = Vec::new();
        let mut visible = false;
        for (at, v) in self.reveal_log() {
            if v && !visible {
                times.push(at);
            }
            visible = v;
        }
        times
    }

    /// Times at which the overlay stopped being visible
    pub fn hide_times(&self) -> Vec<MonoTime> {
        let mut times = Vec::new();
        let mut visible = false;
        for (at, v) in self.reveal_log() {
            if !v && visible {
                times.push(at);
            }
            visible = v;
        }
        times
    }

    pub fn mode_changes(&self) -> Vec<(MonoTime, Mode)> {
        self.log
            .iter()
            .filter_map(|e| match e.emission {
                Emission::ModeChanged { mode } => Some((e.at, mode)),
                _ => None,
            })
            .collect()
    }

    pub fn interactions(&self) -> Vec<&InteractionState> {
        self.log
            .iter()
            .filter_map(|e| match &e.emission {
                Emission::Interaction(state) => Some(state),
                _ => None,
            })
            .collect()
    }

    /// Content drawn on each selection start
    pub fn selections(&self) -> Vec<String> {
        let mut out = Vec::new();
        let mut active = false;
        for state in self.interactions() {
            if state.selection_active && !active {
                out.push(state.selected_content.clone());
            }
            active = state.selection_active;
        }
        out
    }

    /// Check the recorded log against the interaction invariants.
    /// Returns a description of every violation found.
    pub fn violations(&self) -> Vec<String> {
        let mut violations = Vec::new();

        let mut prev: Option<&InteractionState> = None;
        let mut shows_this_cycle = 0usize;
        let mut visible = false;

        for TimedEmission { at, emission } in &self.log {
            match emission {
                Emission::Interaction(state) => {
                    if !state.is_consistent() {
                        violations.push(format!("{at:?}: selection active while gathered"));
                    }
                    if let Some(prev) = prev {
                        let rising = state.selection_active && !prev.selection_active;
                        if !rising && state.selected_content != prev.selected_content {
                            violations.push(format!(
                                "{at:?}: content changed without a new selection"
                            ));
                        }
                    }
                    if visible && state.selection_active {
                        // Must be followed by a hide within the same step
                        let hidden = self.log.iter().any(|e| {
                            e.at == *at && e.emission == Emission::RevealVisibility { visible: false }
                        });
                        if !hidden {
                            violations.push(format!("{at:?}: overlay visible while selecting"));
                        }
                    }
                    prev = Some(state);
                }
                Emission::ModeChanged { mode: Mode::Gathered } => shows_this_cycle = 0,
                Emission::RevealVisibility { visible: v } => {
                    if *v {
                        shows_this_cycle += 1;
                        if shows_this_cycle > 1 {
                            violations.push(format!("{at:?}: second reveal in one cycle"));
                        }
                        match prev {
                            Some(state) if state.is_free() => {}
                            _ => violations.push(format!("{at:?}: reveal without an open gate")),
                        }
                    }
                    visible = *v;
                }
                _ => {}
            }
        }

        violations
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn runner() -> ScenarioRunner {
        ScenarioRunner::new(ScenarioConfig::default()).unwrap()
    }

    #[test]
    fn test_frames_advance_clock() {
        let mut r = runner();
        r.run([
            Step::Frame(SyntheticPose::Open),
            Step::Frame(SyntheticPose::Open),
        ]);
        assert_eq!(r.now(), MonoTime::from_millis(66));
        assert_eq!(r.stats().frames, 2);
        assert_eq!(r.interactions().len(), 2);
    }

    #[test]
    fn test_hold_ends_on_time() {
        let mut r = runner();
        r.step(Step::Hold(SyntheticPose::Open, Duration::from_millis(1000)));
        assert_eq!(r.now(), MonoTime::from_millis(1000));
        assert_eq!(r.stats().frames, 30);
    }

    #[test]
    fn test_wait_polls_deadlines_exactly() {
        let mut r = runner();
        r.step(Step::Toggle);
        r.step(Step::Wait(Duration::from_secs(20)));

        assert_eq!(r.reveal_times(), vec![MonoTime::from_millis(2000)]);
        assert_eq!(r.hide_times(), vec![MonoTime::from_millis(10_000)]);
        let content = r
            .log()
            .iter()
            .find(|e| e.emission == Emission::OverlayContent { visible: true })
            .map(|e| e.at);
        assert_eq!(content, Some(MonoTime::from_millis(3200)));
    }

    #[test]
    fn test_malformed_step() {
        let mut r = runner();
        r.run([Step::Frame(SyntheticPose::Open), Step::Malformed]);
        assert_eq!(r.stats().malformed_frames, 1);
        assert_eq!(r.state().mode, Mode::Dispersed);
    }

    #[test]
    fn test_violation_detector_flags_bad_log() {
        let mut r = runner();
        let mut bad = InteractionState::new();
        bad.selection_active = true;
        r.log.push(TimedEmission {
            at: MonoTime::ZERO,
            emission: Emission::Interaction(bad),
        });
        assert_eq!(r.violations().len(), 1);
    }

    #[test]
    fn test_clean_session_has_no_violations() {
        let mut r = runner();
        r.run([
            Step::Hold(SyntheticPose::Open, Duration::from_millis(2500)),
            Step::Hold(SyntheticPose::Pinch, Duration::from_millis(500)),
            Step::Hold(SyntheticPose::Fist, Duration::from_millis(300)),
            Step::Hold(SyntheticPose::Open, Duration::from_millis(2500)),
        ]);
        assert!(r.violations().is_empty(), "{:?}", r.violations());
        assert_eq!(r.reveal_times().len(), 2);
    }
}
