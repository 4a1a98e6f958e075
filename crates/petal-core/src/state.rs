//! Interaction state - what the renderer and overlay consume every frame

use crate::Point3;

/// Two-valued interaction mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Mode {
    /// Particles gathered into the shape; selection disabled
    #[default]
    Gathered,
    /// Particles dispersed; selection and reveal enabled
    Dispersed,
}

impl Mode {
    /// The other mode
    pub fn flipped(self) -> Mode {
        match self {
            Mode::Gathered => Mode::Dispersed,
            Mode::Dispersed => Mode::Gathered,
        }
    }

    pub fn is_dispersed(self) -> bool {
        self == Mode::Dispersed
    }

    pub fn name(self) -> &'static str {
        match self {
            Mode::Gathered => "gathered",
            Mode::Dispersed => "dispersed",
        }
    }
}

impl std::fmt::Display for Mode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Continuous orientation derived from the wrist (radians)
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Orientation {
    pub yaw: f32,
    pub pitch: f32,
}

impl Orientation {
    pub fn new(yaw: f32, pitch: f32) -> Self {
        Self { yaw, pitch }
    }
}

/// Per-frame interaction state
///
/// `selection_active` is only ever true while `mode` is dispersed, and
/// `selected_content` only changes on the rising edge of `selection_active`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct InteractionState {
    pub mode: Mode,
    pub selection_active: bool,
    pub selected_content: String,
    pub cursor: Point3,
}

impl InteractionState {
    /// Initial state: gathered, nothing selected
    pub fn new() -> Self {
        Self::default()
    }

    /// Does this state satisfy the mode/selection invariant?
    pub fn is_consistent(&self) -> bool {
        !self.selection_active || self.mode.is_dispersed()
    }

    /// Dispersed and not selecting (the reveal gate)
    pub fn is_free(&self) -> bool {
        self.mode.is_dispersed() && !self.selection_active
    }
}
