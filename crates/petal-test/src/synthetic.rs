//! Synthetic Hands - seeded landmark sets for the four poses that matter
//!
//! Geometry is relative to the wrist: finger bases sit 0.2 above it, open
//! tips 0.5 above, folded tips 0.1 above. That leaves wide margins around the
//! fold and pinch thresholds, so moderate jitter never changes the pose.

use petal_core::{HandFrame, Landmark, Point3};
use petal_runtime::Detection;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Pose to synthesize
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SyntheticPose {
    /// All fingers extended, thumb away from the index
    Open,
    /// All fingers curled, thumb resting against them
    Fist,
    /// Fingers extended, thumb tip on the index tip
    Pinch,
    /// Fingers curled and thumb tip on the (curled) index tip
    PinchedFist,
}

impl SyntheticPose {
    pub const ALL: [SyntheticPose; 4] = [
        SyntheticPose::Open,
        SyntheticPose::Fist,
        SyntheticPose::Pinch,
        SyntheticPose::PinchedFist,
    ];

    fn folded(self) -> bool {
        matches!(self, SyntheticPose::Fist | SyntheticPose::PinchedFist)
    }

    fn pinched(self) -> bool {
        matches!(self, SyntheticPose::Pinch | SyntheticPose::PinchedFist)
    }
}

/// Generator configuration
#[derive(Clone, Debug)]
pub struct HandGeneratorConfig {
    /// Wrist position (normalized)
    pub wrist: (f32, f32),
    /// Maximum per-coordinate noise (uniform, +/-)
    pub jitter: f32,
    /// Probability that a detection comes back empty
    pub dropout_prob: f64,
    /// Random seed
    pub seed: u64,
}

impl Default for HandGeneratorConfig {
    fn default() -> Self {
        HandGeneratorConfig {
            wrist: (0.5, 0.9),
            jitter: 0.004,
            dropout_prob: 0.0,
            seed: 42,
        }
    }
}

impl HandGeneratorConfig {
    /// No noise at all
    pub fn exact() -> Self {
        HandGeneratorConfig {
            jitter: 0.0,
            ..Default::default()
        }
    }

    /// Noisy detector that loses the hand now and then
    pub fn flaky() -> Self {
        HandGeneratorConfig {
            jitter: 0.008,
            dropout_prob: 0.1,
            ..Default::default()
        }
    }
}

/// (base, pip, dip, tip, x offset from wrist)
const FINGERS: [(Landmark, Landmark, Landmark, Landmark, f32); 4] = [
    (Landmark::IndexMcp, Landmark::IndexPip, Landmark::IndexDip, Landmark::IndexTip, -0.05),
    (Landmark::MiddleMcp, Landmark::MiddlePip, Landmark::MiddleDip, Landmark::MiddleTip, 0.0),
    (Landmark::RingMcp, Landmark::RingPip, Landmark::RingDip, Landmark::RingTip, 0.05),
    (Landmark::PinkyMcp, Landmark::PinkyPip, Landmark::PinkyDip, Landmark::PinkyTip, 0.1),
];

const BASE_RISE: f32 = 0.2;
const OPEN_TIP_RISE: f32 = 0.5;
const FOLDED_TIP_RISE: f32 = 0.1;

/// Noise-free landmarks for a pose with the wrist at `wrist`
pub fn hand_points(pose: SyntheticPose, wrist: (f32, f32)) -> Vec<Point3> {
    let (wx, wy) = wrist;
    let wrist_point = Point3::new(wx, wy, 0.0);
    let mut points = vec![wrist_point; Landmark::COUNT];

    let tip_rise = if pose.folded() {
        FOLDED_TIP_RISE
    } else {
        OPEN_TIP_RISE
    };
    for (base, pip, dip, tip, dx) in FINGERS {
        let base_point = Point3::new(wx + dx, wy - BASE_RISE, 0.0);
        let tip_point = Point3::new(wx + dx, wy - tip_rise, 0.0);
        points[base.index()] = base_point;
        points[pip.index()] = base_point.lerp(&tip_point, 0.4);
        points[dip.index()] = base_point.lerp(&tip_point, 0.7);
        points[tip.index()] = tip_point;
    }

    let index_tip = points[Landmark::IndexTip.index()];
    let thumb_tip = if pose.pinched() {
        Point3::new(index_tip.x - 0.01, index_tip.y, 0.0)
    } else if pose.folded() {
        Point3::new(wx - 0.1, wy - 0.15, 0.0)
    } else {
        Point3::new(wx - 0.2, wy - 0.3, 0.0)
    };
    let thumb_base = Point3::new(wx - 0.08, wy - 0.05, 0.0);
    points[Landmark::ThumbCmc.index()] = thumb_base;
    points[Landmark::ThumbMcp.index()] = thumb_base.lerp(&thumb_tip, 0.4);
    points[Landmark::ThumbIp.index()] = thumb_base.lerp(&thumb_tip, 0.7);
    points[Landmark::ThumbTip.index()] = thumb_tip;

    points
}

/// Seeded hand generator
pub struct HandGenerator {
    config: HandGeneratorConfig,
    rng: StdRng,
}

impl HandGenerator {
    pub fn new(config: HandGeneratorConfig) -> Self {
        let rng = StdRng::seed_from_u64(config.seed);
        HandGenerator { config, rng }
    }

    /// Default geometry and jitter with a specific seed
    pub fn seeded(seed: u64) -> Self {
        Self::new(HandGeneratorConfig {
            seed,
            ..Default::default()
        })
    }

    pub fn config(&self) -> &HandGeneratorConfig {
        &self.config
    }

    /// Jittered landmarks for a pose
    pub fn points(&mut self, pose: SyntheticPose) -> Vec<Point3> {
        let mut points = hand_points(pose, self.config.wrist);
        let jitter = self.config.jitter;
        if jitter > 0.0 {
            for p in points.iter_mut() {
                p.x += self.rng.gen_range(-jitter..=jitter);
                p.y += self.rng.gen_range(-jitter..=jitter);
                p.z += self.rng.gen_range(-jitter..=jitter);
            }
        }
        points
    }

    /// Jittered hand frame for a pose
    pub fn frame(&mut self, pose: SyntheticPose) -> HandFrame {
        HandFrame::from_points(&self.points(pose)).expect("synthetic hand has 21 finite points")
    }

    /// Detector callback for a pose, subject to dropouts
    pub fn detection(&mut self, pose: SyntheticPose) -> Detection {
        if self.config.dropout_prob > 0.0 && self.rng.gen_bool(self.config.dropout_prob) {
            Detection::NoHand
        } else {
            Detection::Hand(self.frame(pose))
        }
    }

    /// A truncated landmark set, as a detector might deliver mid-failure
    pub fn malformed(&mut self) -> Vec<Point3> {
        let mut points = self.points(SyntheticPose::Open);
        let keep = self.rng.gen_range(1..Landmark::COUNT);
        points.truncate(keep);
        points
    }

    /// Random pose, uniformly
    pub fn random_pose(&mut self) -> SyntheticPose {
        SyntheticPose::ALL[self.rng.gen_range(0..SyntheticPose::ALL.len())]
    }

    pub fn rng(&mut self) -> &mut StdRng {
        &mut self.rng
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use petal_gesture::{PoseClassifier, RawPose};

    fn expected(pose: SyntheticPose) -> RawPose {
        match pose {
            SyntheticPose::Open => RawPose::Open,
            SyntheticPose::Fist => RawPose::Fist,
            SyntheticPose::Pinch | SyntheticPose::PinchedFist => RawPose::Pinch,
        }
    }

    #[test]
    fn test_exact_poses_classify() {
        let classifier = PoseClassifier::default();
        let mut hands = HandGenerator::new(HandGeneratorConfig::exact());
        for pose in SyntheticPose::ALL {
            let c = classifier.classify(&hands.frame(pose));
            assert_eq!(c.pose, expected(pose), "{pose:?}");
        }
    }

    #[test]
    fn test_jittered_poses_classify() {
        let classifier = PoseClassifier::default();
        let mut hands = HandGenerator::new(HandGeneratorConfig {
            jitter: 0.008,
            ..Default::default()
        });
        for _ in 0..500 {
            let pose = hands.random_pose();
            let c = classifier.classify(&hands.frame(pose));
            assert_eq!(c.pose, expected(pose), "{pose:?}");
        }
    }

    #[test]
    fn test_fist_folds_all_four() {
        let classifier = PoseClassifier::default();
        let mut hands = HandGenerator::seeded(3);
        assert_eq!(classifier.classify(&hands.frame(SyntheticPose::Fist)).folded, 4);
        assert_eq!(classifier.classify(&hands.frame(SyntheticPose::Open)).folded, 0);
    }

    #[test]
    fn test_same_seed_same_hands() {
        let mut a = HandGenerator::seeded(9);
        let mut b = HandGenerator::seeded(9);
        for pose in SyntheticPose::ALL {
            assert_eq!(a.points(pose), b.points(pose));
        }
    }

    #[test]
    fn test_malformed_is_short() {
        let mut hands = HandGenerator::seeded(5);
        for _ in 0..50 {
            let points = hands.malformed();
            assert!(!points.is_empty());
            assert!(points.len() < Landmark::COUNT);
            assert!(HandFrame::from_points(&points).is_err());
        }
    }

    #[test]
    fn test_dropouts() {
        let mut hands = HandGenerator::new(HandGeneratorConfig {
            dropout_prob: 0.5,
            ..Default::default()
        });
        let dropped = (0..1000)
            .filter(|_| hands.detection(SyntheticPose::Open) == Detection::NoHand)
            .count();
        assert!(dropped > 350 && dropped < 650, "dropped {dropped}");

        let mut hands = HandGenerator::seeded(1);
        assert!((0..100).all(|_| hands.detection(SyntheticPose::Open) != Detection::NoHand));
    }
}
