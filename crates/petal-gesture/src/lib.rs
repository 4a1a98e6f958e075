//! Petal Gesture
//!
//! Turns one detector frame into one discrete pose, then filters the pose
//! stream so a single noisy frame cannot start or end a selection.
//!
//! # Pipeline
//!
//! HandFrame → [`PoseClassifier`] → [`RawPose`] → [`ConfidenceStabilizer`] → stable bool
//!
//! Classification is pure. The stabilizer carries one bounded counter.

pub mod pose;
pub mod stabilizer;

pub use pose::*;
pub use stabilizer::*;
