//! Emissions - everything the runtime tells its consumers

use petal_core::{InteractionState, Mode, Orientation, PetalError, PetalResult};

/// Detector lifecycle as reported by the frame producer
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum DetectorStatus {
    /// Camera or model still initializing
    #[default]
    Starting,
    /// Delivering frames
    Online,
    /// Terminal failure (no camera, model failed to load, ...)
    Unavailable(String),
}

impl DetectorStatus {
    pub fn is_online(&self) -> bool {
        matches!(self, DetectorStatus::Online)
    }

    pub fn is_unavailable(&self) -> bool {
        matches!(self, DetectorStatus::Unavailable(_))
    }

    /// Error out once the detector has failed for good
    pub fn ensure_available(&self) -> PetalResult<()> {
        match self {
            DetectorStatus::Unavailable(reason) => {
                Err(PetalError::DetectorUnavailable(reason.clone()))
            }
            _ => Ok(()),
        }
    }
}

/// One output event, in the order it happened
#[derive(Debug, Clone, PartialEq)]
pub enum Emission {
    /// Interaction mode changed
    ModeChanged { mode: Mode },
    /// Wrist orientation for a hand frame
    Orientation(Orientation),
    /// Full interaction state, once per processed frame or toggle
    Interaction(InteractionState),
    /// Reveal overlay visibility, on every reveal phase transition
    RevealVisibility { visible: bool },
    /// Overlay content visibility (delayed after the overlay itself)
    OverlayContent { visible: bool },
    /// Detector status changed
    DetectorStatus(DetectorStatus),
}

impl Emission {
    /// Short name for logs
    pub fn kind(&self) -> &'static str {
        match self {
            Emission::ModeChanged { .. } => "mode_changed",
            Emission::Orientation(_) => "orientation",
            Emission::Interaction(_) => "interaction",
            Emission::RevealVisibility { .. } => "reveal_visibility",
            Emission::OverlayContent { .. } => "overlay_content",
            Emission::DetectorStatus(_) => "detector_status",
        }
    }
}
