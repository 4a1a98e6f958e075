//! Pose Classifier - one hand frame in, one discrete pose out
//!
//! This is NOT a gesture vocabulary. There are exactly two poses that drive
//! the interaction (pinch and fist); everything else is "open".

use std::f32::consts::PI;

use petal_core::{HandFrame, Landmark, Orientation, Point3};

/// Raw per-frame pose signal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RawPose {
    /// Thumb tip and index tip touching
    Pinch,
    /// At least three of the four tracked fingers folded
    Fist,
    /// Anything else
    Open,
}

impl RawPose {
    pub fn is_pinch(self) -> bool {
        self == RawPose::Pinch
    }

    pub fn is_fist(self) -> bool {
        self == RawPose::Fist
    }
}

/// Affine map from normalized frame coordinates into the renderer's world space
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CursorMapping {
    pub scale_x: f32,
    pub scale_y: f32,
    pub offset_x: f32,
    pub offset_y: f32,
}

impl Default for CursorMapping {
    fn default() -> Self {
        Self {
            scale_x: 35.0,
            scale_y: 25.0,
            offset_x: 0.0,
            offset_y: 5.0,
        }
    }
}

impl CursorMapping {
    /// Map a normalized point. The frame is mirrored on both axes; depth is dropped.
    pub fn map(&self, p: Point3) -> Point3 {
        Point3::new(
            (0.5 - p.x) * self.scale_x + self.offset_x,
            (0.5 - p.y) * self.scale_y + self.offset_y,
            0.0,
        )
    }
}

/// Classifier configuration
#[derive(Debug, Clone, PartialEq)]
pub struct ClassifierConfig {
    /// Thumb-index distance (normalized units) below which the hand is pinching
    pub pinch_threshold: f32,

    /// Extra margin on the base-to-wrist distance when testing for a fold
    pub fold_tolerance: f32,

    /// Folded fingers (out of four) needed for a fist
    pub fist_min_folded: usize,

    /// Cursor mapping into world space
    pub cursor: CursorMapping,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            pinch_threshold: 0.035,
            fold_tolerance: 0.10,
            fist_min_folded: 3,
            cursor: CursorMapping::default(),
        }
    }
}

/// Fingers checked for a fist: (tip, base)
const FOLD_FINGERS: [(Landmark, Landmark); 4] = [
    (Landmark::MiddleTip, Landmark::MiddleMcp),
    (Landmark::RingTip, Landmark::RingMcp),
    (Landmark::PinkyTip, Landmark::PinkyMcp),
    (Landmark::IndexTip, Landmark::IndexMcp),
];

/// Result of classifying one hand frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Classification {
    pub pose: RawPose,

    /// Thumb-index midpoint in world space
    pub cursor: Point3,

    /// Wrist-driven orientation, independent of the pose
    pub orientation: Orientation,

    /// Thumb-index distance (normalized)
    pub pinch_distance: f32,

    /// How many of the four fingers counted as folded (0 when pinching)
    pub folded: usize,
}

/// What one detector callback produced
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Observation {
    Hand(Classification),
    /// No hand, or a frame too broken to classify
    NoHand,
}

impl Observation {
    pub fn pose(&self) -> Option<RawPose> {
        match self {
            Observation::Hand(c) => Some(c.pose),
            Observation::NoHand => None,
        }
    }

    pub fn is_pinch(&self) -> bool {
        self.pose() == Some(RawPose::Pinch)
    }
}

/// Stateless pose classifier
#[derive(Debug, Clone, Default)]
pub struct PoseClassifier {
    config: ClassifierConfig,
}

impl PoseClassifier {
    pub fn new(config: ClassifierConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ClassifierConfig {
        &self.config
    }

    /// Classify a detector result; `None` means no hand was detected
    pub fn observe(&self, frame: Option<&HandFrame>) -> Observation {
        match frame {
            Some(frame) => Observation::Hand(self.classify(frame)),
            None => Observation::NoHand,
        }
    }

    /// Classify one hand frame
    pub fn classify(&self, frame: &HandFrame) -> Classification {
        let thumb = frame.point(Landmark::ThumbTip);
        let index = frame.point(Landmark::IndexTip);
        let pinch_distance = thumb.distance_2d(&index);

        // Pinch wins over everything: a curled hand that is pinching is still a pinch
        let (pose, folded) = if pinch_distance < self.config.pinch_threshold {
            (RawPose::Pinch, 0)
        } else {
            let folded = self.folded_fingers(frame);
            if folded >= self.config.fist_min_folded {
                (RawPose::Fist, folded)
            } else {
                (RawPose::Open, folded)
            }
        };

        let classification = Classification {
            pose,
            cursor: self.config.cursor.map(thumb.midpoint(&index)),
            orientation: orientation(frame.point(Landmark::Wrist)),
            pinch_distance,
            folded,
        };

        tracing::trace!(
            pose = ?classification.pose,
            pinch_distance = classification.pinch_distance,
            folded = classification.folded,
            "classified frame"
        );

        classification
    }

    /// Count fingers whose tip is closer to the wrist than their base is
    pub fn folded_fingers(&self, frame: &HandFrame) -> usize {
        let wrist = frame.point(Landmark::Wrist);
        let margin = 1.0 + self.config.fold_tolerance;

        FOLD_FINGERS
            .iter()
            .filter(|(tip, base)| {
                let tip_dist = frame.point(*tip).distance_2d(&wrist);
                let base_dist = frame.point(*base).distance_2d(&wrist);
                tip_dist < base_dist * margin
            })
            .count()
    }
}

/// Orientation from the wrist position: yaw follows x, a small pitch follows y
pub fn orientation(wrist: Point3) -> Orientation {
    Orientation::new((0.5 - wrist.x) * 2.0 * PI, (wrist.y - 0.5) * 0.3 * PI)
}
