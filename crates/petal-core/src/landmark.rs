//! Hand landmarks - the raw keypoints a detector produces per video frame
//!
//! A [`HandFrame`] is ephemeral: it is classified once and dropped.

use crate::{PetalError, PetalResult};

/// Labeled hand keypoint, in detector order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Landmark {
    Wrist,

    // Thumb
    ThumbCmc,
    ThumbMcp,
    ThumbIp,
    ThumbTip,

    // Index
    IndexMcp,
    IndexPip,
    IndexDip,
    IndexTip,

    // Middle
    MiddleMcp,
    MiddlePip,
    MiddleDip,
    MiddleTip,

    // Ring
    RingMcp,
    RingPip,
    RingDip,
    RingTip,

    // Pinky
    PinkyMcp,
    PinkyPip,
    PinkyDip,
    PinkyTip,
}

impl Landmark {
    /// Number of landmarks in a complete frame
    pub const COUNT: usize = 21;

    /// All landmarks in order
    pub fn all() -> &'static [Landmark; Landmark::COUNT] {
        &[
            Landmark::Wrist,
            Landmark::ThumbCmc,
            Landmark::ThumbMcp,
            Landmark::ThumbIp,
            Landmark::ThumbTip,
            Landmark::IndexMcp,
            Landmark::IndexPip,
            Landmark::IndexDip,
            Landmark::IndexTip,
            Landmark::MiddleMcp,
            Landmark::MiddlePip,
            Landmark::MiddleDip,
            Landmark::MiddleTip,
            Landmark::RingMcp,
            Landmark::RingPip,
            Landmark::RingDip,
            Landmark::RingTip,
            Landmark::PinkyMcp,
            Landmark::PinkyPip,
            Landmark::PinkyDip,
            Landmark::PinkyTip,
        ]
    }

    /// Index of this landmark in a frame
    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }
}

/// 3D point; x/y normalized to the video frame, z is detector depth
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Point3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Point3 {
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    pub fn zero() -> Self {
        Self::default()
    }

    /// Linear interpolation
    pub fn lerp(&self, other: &Point3, t: f32) -> Point3 {
        Point3 {
            x: self.x + (other.x - self.x) * t,
            y: self.y + (other.y - self.y) * t,
            z: self.z + (other.z - self.z) * t,
        }
    }

    pub fn midpoint(&self, other: &Point3) -> Point3 {
        self.lerp(other, 0.5)
    }

    /// Distance in the image plane (depth ignored)
    pub fn distance_2d(&self, other: &Point3) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }
}

/// One detected hand: exactly 21 finite keypoints
#[derive(Debug, Clone, PartialEq)]
pub struct HandFrame {
    points: [Point3; Landmark::COUNT],
}

impl HandFrame {
    /// Build a frame from detector output.
    ///
    /// Anything other than 21 finite points is rejected; callers treat the
    /// error as "no hand detected".
    pub fn from_points(points: &[Point3]) -> PetalResult<Self> {
        if points.len() != Landmark::COUNT {
            return Err(PetalError::MalformedFrame {
                expected: Landmark::COUNT,
                actual: points.len(),
            });
        }

        let mut frame = [Point3::zero(); Landmark::COUNT];
        for (landmark, (slot, point)) in Landmark::all()
            .iter()
            .zip(frame.iter_mut().zip(points.iter()))
        {
            if !point.is_finite() {
                return Err(PetalError::NonFiniteCoordinate(*landmark));
            }
            *slot = *point;
        }

        Ok(Self { points: frame })
    }

    /// Get a keypoint by label
    #[inline]
    pub fn point(&self, landmark: Landmark) -> Point3 {
        self.points[landmark.index()]
    }

    /// Replace a keypoint
    pub fn set_point(&mut self, landmark: Landmark, point: Point3) {
        self.points[landmark.index()] = point;
    }

    pub fn points(&self) -> &[Point3; Landmark::COUNT] {
        &self.points
    }
}
