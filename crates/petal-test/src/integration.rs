//! End-to-end Integration Scenarios
//!
//! Whole-pipeline sessions, from synthetic landmarks to emitted reveal
//! visibility:
//! - Full reveal cycle with natural expiry
//! - Selection interrupting a visible overlay
//! - Gathered resets mid-pending and mid-shown
//! - Randomized sessions checked against every interaction invariant

use std::time::Duration;

use petal_core::PetalResult;
use petal_runtime::DetectorStatus;
use rand::Rng;

use crate::scenario::{ScenarioConfig, ScenarioRunner, Step};
use crate::synthetic::{HandGeneratorConfig, SyntheticPose};

// ============================================================================
// SCRIPTED SCENARIOS
// ============================================================================

fn ms(v: u64) -> Duration {
    Duration::from_millis(v)
}

/// Open hand long enough for the overlay to show and expire
pub fn scenario_full_reveal_cycle() -> PetalResult<ScenarioRunner> {
    let mut runner = ScenarioRunner::new(ScenarioConfig::default())?;
    runner.run([Step::Hold(SyntheticPose::Open, ms(12_000))]);
    Ok(runner)
}

/// Overlay shows, then a held pinch interrupts it, then the hand relaxes
pub fn scenario_selection_interrupts_reveal() -> PetalResult<ScenarioRunner> {
    let mut runner = ScenarioRunner::new(ScenarioConfig::default())?;
    runner.run([
        Step::Hold(SyntheticPose::Open, ms(3000)),
        Step::Hold(SyntheticPose::Pinch, ms(1000)),
        Step::Hold(SyntheticPose::Open, ms(10_000)),
    ]);
    Ok(runner)
}

/// Two dispersed excursions separated by a fist
pub fn scenario_gathered_reset() -> PetalResult<ScenarioRunner> {
    let mut runner = ScenarioRunner::new(ScenarioConfig::default())?;
    runner.run([
        Step::Hold(SyntheticPose::Open, ms(4000)),
        Step::Hold(SyntheticPose::Fist, ms(500)),
        Step::Hold(SyntheticPose::Open, ms(4000)),
    ]);
    Ok(runner)
}

/// Pinch and release repeatedly before the pending delay ever elapses
pub fn scenario_restless_hand() -> PetalResult<ScenarioRunner> {
    let mut runner = ScenarioRunner::new(ScenarioConfig::default())?;
    let mut steps = Vec::new();
    for _ in 0..6 {
        steps.push(Step::Hold(SyntheticPose::Open, ms(1500)));
        steps.push(Step::Hold(SyntheticPose::Pinch, ms(300)));
    }
    steps.push(Step::Hold(SyntheticPose::Open, ms(2500)));
    runner.run(steps);
    Ok(runner)
}

/// Random session: poses, dropouts, malformed frames, toggles and pauses
pub fn random_session(seed: u64, steps: usize) -> PetalResult<ScenarioRunner> {
    let mut runner = ScenarioRunner::new(ScenarioConfig {
        hands: HandGeneratorConfig {
            seed,
            ..HandGeneratorConfig::flaky()
        },
        ..Default::default()
    })?;

    for _ in 0..steps {
        let roll = runner.hands().rng().gen_range(0..100);
        let step = match roll {
            0..=59 => {
                let pose = runner.hands().random_pose();
                let hold = runner.hands().rng().gen_range(30..1500);
                Step::Hold(pose, ms(hold))
            }
            60..=74 => Step::NoHand,
            75..=79 => Step::Malformed,
            80..=89 => Step::Toggle,
            90..=97 => {
                let wait = runner.hands().rng().gen_range(100..9000);
                Step::Wait(ms(wait))
            }
            _ => Step::Status(DetectorStatus::Unavailable("camera lost".to_string())),
        };
        runner.step(step);
    }

    Ok(runner)
}

// ============================================================================
// TESTS
// ============================================================================
