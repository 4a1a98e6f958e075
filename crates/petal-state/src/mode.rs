//! Interaction Mode Machine
//!
//! Owns the gathered/dispersed mode and the selection sub-state. Mode changes
//! come from the classifier (a fist gathers, anything else disperses) or from
//! an explicit toggle. Selection follows the stabilized pinch signal and only
//! exists while dispersed.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use petal_core::{InteractionState, Mode, Orientation, PetalError, PetalResult, Point3};
use petal_gesture::{ConfidenceStabilizer, Observation, StabilizerConfig};

/// Fixed pool of short strings drawn on each new selection
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentPool {
    items: Vec<String>,
}

impl ContentPool {
    /// Build a pool; an empty pool is rejected
    pub fn new<I, S>(items: I) -> PetalResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let items: Vec<String> = items.into_iter().map(Into::into).collect();
        if items.is_empty() {
            return Err(PetalError::EmptyContentPool);
        }
        Ok(Self { items })
    }

    /// Uniform draw
    pub fn draw<R: Rng + ?Sized>(&self, rng: &mut R) -> &str {
        &self.items[rng.gen_range(0..self.items.len())]
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn contains(&self, item: &str) -> bool {
        self.items.iter().any(|i| i == item)
    }

    pub fn items(&self) -> &[String] {
        &self.items
    }
}

impl Default for ContentPool {
    fn default() -> Self {
        Self {
            items: [
                "Peace", "Warmth", "Light", "Grace", "Hope", "Love", "Neural", "Sakura", "Spirit",
                "Joy",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
        }
    }
}

/// Mode machine configuration
#[derive(Debug, Clone, Default)]
pub struct ModeConfig {
    pub stabilizer: StabilizerConfig,
    pub content_pool: ContentPool,
}

/// Selection sub-state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Selection {
    #[default]
    Inactive,
    Active,
}

/// Edge of the selection signal
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionEdge {
    /// Inactive → active; fresh content was drawn
    Rising,
    /// Active → inactive; content kept for the fade-out
    Falling,
}

/// What one input did to the machine
#[derive(Debug, Clone, PartialEq)]
pub struct FrameOutcome {
    /// New mode, if the mode changed
    pub mode_change: Option<Mode>,

    /// Selection edge, if any
    pub selection_edge: Option<SelectionEdge>,

    /// Orientation for this frame (hand frames only)
    pub orientation: Option<Orientation>,

    /// Full state after the input
    pub state: InteractionState,
}

/// Two-mode interaction state machine
pub struct InteractionMachine<R = StdRng> {
    state: InteractionState,
    selection: Selection,
    stabilizer: ConfidenceStabilizer,
    pool: ContentPool,
    /// Mode last requested by the classifier; only changes of it act
    pose_request: Mode,
    rng: R,
}

impl InteractionMachine<StdRng> {
    /// Create a machine with an entropy-seeded RNG
    pub fn new(config: ModeConfig) -> Self {
        Self::with_rng(config, StdRng::from_entropy())
    }

    /// Create a machine with a deterministic RNG
    pub fn seeded(config: ModeConfig, seed: u64) -> Self {
        Self::with_rng(config, StdRng::seed_from_u64(seed))
    }
}

impl<R: Rng> InteractionMachine<R> {
    pub fn with_rng(config: ModeConfig, rng: R) -> Self {
        Self {
            state: InteractionState::new(),
            selection: Selection::Inactive,
            stabilizer: ConfidenceStabilizer::new(config.stabilizer),
            pool: config.content_pool,
            pose_request: Mode::Gathered,
            rng,
        }
    }

    pub fn state(&self) -> &InteractionState {
        &self.state
    }

    pub fn mode(&self) -> Mode {
        self.state.mode
    }

    pub fn selection(&self) -> Selection {
        self.selection
    }

    pub fn stabilizer(&self) -> &ConfidenceStabilizer {
        &self.stabilizer
    }

    pub fn content_pool(&self) -> &ContentPool {
        &self.pool
    }

    /// Process one detector observation
    pub fn observe(&mut self, observation: &Observation) -> FrameOutcome {
        let mut mode_change = None;
        let mut selection_edge = None;

        let (pinching, orientation) = match observation {
            Observation::Hand(c) => {
                let request = if c.pose.is_fist() {
                    Mode::Gathered
                } else {
                    Mode::Dispersed
                };
                if request != self.pose_request {
                    self.pose_request = request;
                    if request != self.state.mode {
                        selection_edge = self.enter(request);
                        mode_change = Some(request);
                    }
                }
                self.state.cursor = c.cursor;
                (c.pose.is_pinch(), Some(c.orientation))
            }
            Observation::NoHand => {
                self.state.cursor = Point3::zero();
                (false, None)
            }
        };

        let dispersed = self.state.mode.is_dispersed();
        let stable = self.stabilizer.update(pinching && dispersed);
        if let Some(edge) = self.set_selection(stable && dispersed) {
            selection_edge = Some(edge);
        }

        FrameOutcome {
            mode_change,
            selection_edge,
            orientation,
            state: self.state.clone(),
        }
    }

    /// Flip the mode unconditionally
    pub fn toggle(&mut self) -> FrameOutcome {
        let mode = self.state.mode.flipped();
        let selection_edge = self.enter(mode);

        FrameOutcome {
            mode_change: Some(mode),
            selection_edge,
            orientation: None,
            state: self.state.clone(),
        }
    }

    fn enter(&mut self, mode: Mode) -> Option<SelectionEdge> {
        tracing::info!(from = %self.state.mode, to = %mode, "mode change");
        self.state.mode = mode;

        match mode {
            Mode::Gathered => {
                self.stabilizer.reset();
                self.set_selection(false)
            }
            Mode::Dispersed => None,
        }
    }

    /// Apply the stabilized signal; content is drawn only on the rising edge
    fn set_selection(&mut self, active: bool) -> Option<SelectionEdge> {
        match (self.selection, active) {
            (Selection::Inactive, true) => {
                self.state.selected_content = self.pool.draw(&mut self.rng).to_string();
                self.selection = Selection::Active;
                self.state.selection_active = true;
                tracing::debug!(content = %self.state.selected_content, "selection started");
                Some(SelectionEdge::Rising)
            }
            (Selection::Active, false) => {
                self.selection = Selection::Inactive;
                self.state.selection_active = false;
                tracing::debug!("selection ended");
                Some(SelectionEdge::Falling)
            }
            _ => None,
        }
    }
}

impl Default for InteractionMachine<StdRng> {
    fn default() -> Self {
        Self::new(ModeConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use petal_gesture::{Classification, RawPose};

    fn hand(pose: RawPose) -> Observation {
        Observation::Hand(Classification {
            pose,
            cursor: Point3::new(1.0, 2.0, 0.0),
            orientation: Orientation::new(0.1, 0.2),
            pinch_distance: if pose == RawPose::Pinch { 0.01 } else { 0.2 },
            folded: if pose == RawPose::Fist { 4 } else { 0 },
        })
    }

    fn machine() -> InteractionMachine {
        InteractionMachine::seeded(ModeConfig::default(), 7)
    }

    fn dispersed_and_selecting() -> InteractionMachine {
        let mut m = machine();
        m.observe(&hand(RawPose::Open));
        for _ in 0..3 {
            m.observe(&hand(RawPose::Pinch));
        }
        assert!(m.state().selection_active);
        m
    }

    #[test]
    fn test_initial_state() {
        let m = machine();
        assert_eq!(m.mode(), Mode::Gathered);
        assert_eq!(m.selection(), Selection::Inactive);
        assert_eq!(m.stabilizer().counter(), 0);
    }

    #[test]
    fn test_open_hand_disperses() {
        let mut m = machine();
        let out = m.observe(&hand(RawPose::Open));
        assert_eq!(out.mode_change, Some(Mode::Dispersed));
        assert_eq!(out.state.mode, Mode::Dispersed);
        assert_eq!(out.orientation, Some(Orientation::new(0.1, 0.2)));

        // Same request again is not a change
        let out = m.observe(&hand(RawPose::Open));
        assert_eq!(out.mode_change, None);
    }

    #[test]
    fn test_pinch_disperses() {
        let mut m = machine();
        let out = m.observe(&hand(RawPose::Pinch));
        assert_eq!(out.mode_change, Some(Mode::Dispersed));
    }

    #[test]
    fn test_fist_gathers() {
        let mut m = machine();
        m.observe(&hand(RawPose::Open));
        let out = m.observe(&hand(RawPose::Fist));
        assert_eq!(out.mode_change, Some(Mode::Gathered));
        assert_eq!(m.mode(), Mode::Gathered);
    }

    #[test]
    fn test_selection_needs_three_pinch_frames() {
        let mut m = machine();
        m.observe(&hand(RawPose::Open));

        let first = m.observe(&hand(RawPose::Pinch));
        let second = m.observe(&hand(RawPose::Pinch));
        assert!(!first.state.selection_active);
        assert!(!second.state.selection_active);

        let third = m.observe(&hand(RawPose::Pinch));
        assert!(third.state.selection_active);
        assert_eq!(third.selection_edge, Some(SelectionEdge::Rising));
        assert!(m.content_pool().contains(&third.state.selected_content));
    }

    #[test]
    fn test_pinch_while_gathered_does_not_accumulate() {
        let mut m = machine();
        m.observe(&hand(RawPose::Open));
        m.toggle();
        assert_eq!(m.mode(), Mode::Gathered);

        // Pinch request equals the last request, so the mode stays gathered
        for _ in 0..5 {
            let out = m.observe(&hand(RawPose::Pinch));
            assert!(!out.state.selection_active);
        }
        assert_eq!(m.stabilizer().counter(), 0);
    }

    #[test]
    fn test_fist_resets_selection_and_counter() {
        let mut m = dispersed_and_selecting();
        assert_eq!(m.stabilizer().counter(), 3);

        let out = m.observe(&hand(RawPose::Fist));
        assert_eq!(out.mode_change, Some(Mode::Gathered));
        assert_eq!(out.selection_edge, Some(SelectionEdge::Falling));
        assert!(!out.state.selection_active);
        assert_eq!(m.stabilizer().counter(), 0);
        assert!(out.state.is_consistent());
    }

    #[test]
    fn test_content_stable_while_held() {
        let mut m = dispersed_and_selecting();
        let content = m.state().selected_content.clone();

        for _ in 0..10 {
            let out = m.observe(&hand(RawPose::Pinch));
            assert!(out.state.selection_active);
            assert_eq!(out.state.selected_content, content);
            assert_eq!(out.selection_edge, None);
        }
    }

    #[test]
    fn test_glitch_at_threshold_ends_selection() {
        let mut m = dispersed_and_selecting();

        // Counter 3 -> 2 drops below threshold
        let out = m.observe(&hand(RawPose::Open));
        assert_eq!(out.selection_edge, Some(SelectionEdge::Falling));

        // Building it back is a new selection
        let out = m.observe(&hand(RawPose::Pinch));
        assert_eq!(out.selection_edge, Some(SelectionEdge::Rising));
        assert!(m.content_pool().contains(&out.state.selected_content));
    }

    #[test]
    fn test_saturated_selection_survives_glitch() {
        let mut m = dispersed_and_selecting();
        m.observe(&hand(RawPose::Pinch));
        assert_eq!(m.stabilizer().counter(), 4);
        let content = m.state().selected_content.clone();

        let out = m.observe(&hand(RawPose::Open));
        assert!(out.state.selection_active);
        assert_eq!(out.selection_edge, None);
        assert_eq!(out.state.selected_content, content);
    }

    #[test]
    fn test_release_keeps_last_content() {
        let mut m = dispersed_and_selecting();
        let content = m.state().selected_content.clone();

        for _ in 0..5 {
            m.observe(&hand(RawPose::Open));
        }
        assert!(!m.state().selection_active);
        assert_eq!(m.state().selected_content, content);
    }

    #[test]
    fn test_no_hand_decays_without_mode_change() {
        let mut m = dispersed_and_selecting();
        m.observe(&hand(RawPose::Pinch));

        let out = m.observe(&Observation::NoHand);
        assert_eq!(out.mode_change, None);
        assert_eq!(out.orientation, None);
        assert_eq!(out.state.mode, Mode::Dispersed);
        assert_eq!(out.state.cursor, Point3::zero());
        assert_eq!(m.stabilizer().counter(), 3);

        m.observe(&Observation::NoHand);
        assert!(!m.state().selection_active);
    }

    #[test]
    fn test_toggle_flips_unconditionally() {
        let mut m = machine();
        let out = m.toggle();
        assert_eq!(out.mode_change, Some(Mode::Dispersed));

        let out = m.toggle();
        assert_eq!(out.mode_change, Some(Mode::Gathered));
        assert_eq!(m.mode(), Mode::Gathered);
    }

    #[test]
    fn test_toggle_to_gathered_clears_selection() {
        let mut m = dispersed_and_selecting();
        let out = m.toggle();
        assert_eq!(out.state.mode, Mode::Gathered);
        assert!(!out.state.selection_active);
        assert_eq!(out.selection_edge, Some(SelectionEdge::Falling));
        assert_eq!(m.stabilizer().counter(), 0);
    }

    #[test]
    fn test_toggle_not_overridden_by_held_pose() {
        let mut m = machine();
        m.observe(&hand(RawPose::Open));
        m.toggle();

        // Hand keeps the same open pose: stays gathered
        let out = m.observe(&hand(RawPose::Open));
        assert_eq!(out.mode_change, None);
        assert_eq!(m.mode(), Mode::Gathered);

        // A fresh fist-then-open does disperse again
        m.observe(&hand(RawPose::Fist));
        let out = m.observe(&hand(RawPose::Open));
        assert_eq!(out.mode_change, Some(Mode::Dispersed));
    }

    #[test]
    fn test_content_pool() {
        assert_eq!(ContentPool::default().len(), 10);
        assert_eq!(
            ContentPool::new(Vec::<String>::new()),
            Err(PetalError::EmptyContentPool)
        );

        let pool = ContentPool::new(["only"]).unwrap();
        let mut rng = StdRng::seed_from_u64(1);
        for _ in 0..10 {
            assert_eq!(pool.draw(&mut rng), "only");
        }
    }

    #[test]
    fn test_new_pinch_draws_fresh_content() {
        let config = ModeConfig {
            content_pool: ContentPool::new(["a", "b", "c", "d", "e", "f", "g", "h"]).unwrap(),
            ..ModeConfig::default()
        };
        let mut m = InteractionMachine::seeded(config, 42);
        m.observe(&hand(RawPose::Open));

        let mut seen = std::collections::HashSet::new();
        for _ in 0..40 {
            for _ in 0..3 {
                m.observe(&hand(RawPose::Pinch));
            }
            assert!(m.state().selection_active);
            seen.insert(m.state().selected_content.clone());
            for _ in 0..4 {
                m.observe(&hand(RawPose::Open));
            }
            assert!(!m.state().selection_active);
        }
        // Forty draws over eight items
        assert!(seen.len() > 1);
    }

    mod props {
        use super::*;
        use proptest::prelude::*;

        #[derive(Debug, Clone, Copy)]
        enum Input {
            Frame(RawPose),
            NoHand,
            Toggle,
        }

        fn input() -> impl Strategy<Value = Input> {
            prop_oneof![
                4 => Just(Input::Frame(RawPose::Pinch)),
                2 => Just(Input::Frame(RawPose::Open)),
                1 => Just(Input::Frame(RawPose::Fist)),
                1 => Just(Input::NoHand),
                1 => Just(Input::Toggle),
            ]
        }

        proptest! {
            #[test]
            fn selection_implies_dispersed(inputs in proptest::collection::vec(input(), 0..200)) {
                let mut m = InteractionMachine::seeded(ModeConfig::default(), 3);
                for i in inputs {
                    let out = match i {
                        Input::Frame(pose) => m.observe(&hand(pose)),
                        Input::NoHand => m.observe(&Observation::NoHand),
                        Input::Toggle => m.toggle(),
                    };
                    prop_assert!(out.state.is_consistent());
                    if out.state.mode == Mode::Gathered {
                        prop_assert_eq!(m.stabilizer().counter(), 0);
                    }
                }
            }

            #[test]
            fn content_changes_only_on_rising_edge(inputs in proptest::collection::vec(input(), 0..200)) {
                let mut m = InteractionMachine::seeded(ModeConfig::default(), 11);
                let mut content = m.state().selected_content.clone();
                for i in inputs {
                    let out = match i {
                        Input::Frame(pose) => m.observe(&hand(pose)),
                        Input::NoHand => m.observe(&Observation::NoHand),
                        Input::Toggle => m.toggle(),
                    };
                    if out.selection_edge != Some(SelectionEdge::Rising) {
                        prop_assert_eq!(&out.state.selected_content, &content);
                    }
                    content = out.state.selected_content.clone();
                }
            }
        }
    }
}
