//! Runtime configuration
//!
//! A flat, serializable view over every component's tuning constants. Every
//! field has a default, so a JSON document only needs the keys it overrides.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use petal_core::{PetalError, PetalResult};
use petal_gesture::{ClassifierConfig, CursorMapping, StabilizerConfig};
use petal_state::{ContentPool, ModeConfig, RevealConfig};

use crate::{LoggingConfig, OverlayConfig};

/// Aggregated runtime configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    /// Thumb-index distance below which a frame is a pinch (normalized units)
    pub pinch_threshold: f32,
    /// Margin on the base-to-wrist distance for a finger to count as folded
    pub fold_tolerance: f32,
    /// Folded fingers (of four) needed for a fist
    pub fist_min_folded: usize,
    /// Cursor scale `[x, y]` into world space
    pub cursor_scale: [f32; 2],
    /// Cursor offset `[x, y]` in world space
    pub cursor_offset: [f32; 2],

    /// Qualifying frames needed before a selection starts
    pub confidence_threshold: u32,
    pub content_pool: Vec<String>,
    /// Fixed RNG seed for content draws; entropy when absent
    pub rng_seed: Option<u64>,

    pub pending_delay_ms: u64,
    pub shown_duration_ms: u64,
    pub overlay_content_delay_ms: u64,

    pub logging: LoggingConfig,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        let classifier = ClassifierConfig::default();
        let reveal = RevealConfig::default();

        Self {
            pinch_threshold: classifier.pinch_threshold,
            fold_tolerance: classifier.fold_tolerance,
            fist_min_folded: classifier.fist_min_folded,
            cursor_scale: [classifier.cursor.scale_x, classifier.cursor.scale_y],
            cursor_offset: [classifier.cursor.offset_x, classifier.cursor.offset_y],
            confidence_threshold: StabilizerConfig::default().threshold,
            content_pool: ContentPool::default().items().to_vec(),
            rng_seed: None,
            pending_delay_ms: reveal.pending_delay.as_millis() as u64,
            shown_duration_ms: reveal.shown_duration.as_millis() as u64,
            overlay_content_delay_ms: OverlayConfig::default().content_delay.as_millis() as u64,
            logging: LoggingConfig::default(),
        }
    }
}

impl RuntimeConfig {
    /// Parse and validate a JSON document
    pub fn from_json(json: &str) -> PetalResult<Self> {
        let config: RuntimeConfig =
            serde_json::from_str(json).map_err(|e| PetalError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json(&self) -> PetalResult<String> {
        serde_json::to_string_pretty(self).map_err(|e| PetalError::Config(e.to_string()))
    }

    /// Reject values no component can work with
    pub fn validate(&self) -> PetalResult<()> {
        if !(self.pinch_threshold.is_finite() && self.pinch_threshold > 0.0) {
            return Err(PetalError::InvalidConfig(format!(
                "pinch_threshold must be positive, got {}",
                self.pinch_threshold
            )));
        }
        if !(self.fold_tolerance.is_finite() && self.fold_tolerance >= 0.0) {
            return Err(PetalError::InvalidConfig(format!(
                "fold_tolerance must be non-negative, got {}",
                self.fold_tolerance
            )));
        }
        if self.fist_min_folded == 0 || self.fist_min_folded > 4 {
            return Err(PetalError::InvalidConfig(format!(
                "fist_min_folded must be in 1..=4, got {}",
                self.fist_min_folded
            )));
        }
        if self
            .cursor_scale
            .iter()
            .chain(self.cursor_offset.iter())
            .any(|v| !v.is_finite())
        {
            return Err(PetalError::InvalidConfig(
                "cursor mapping must be finite".to_string(),
            ));
        }
        if self.confidence_threshold == 0 {
            return Err(PetalError::InvalidConfig(
                "confidence_threshold must be at least 1".to_string(),
            ));
        }
        if self.content_pool.is_empty() {
            return Err(PetalError::EmptyContentPool);
        }
        if self.pending_delay_ms == 0 || self.shown_duration_ms == 0 {
            return Err(PetalError::InvalidConfig(
                "reveal delays must be non-zero".to_string(),
            ));
        }
        Ok(())
    }

    pub fn classifier(&self) -> ClassifierConfig {
        ClassifierConfig {
            pinch_threshold: self.pinch_threshold,
            fold_tolerance: self.fold_tolerance,
            fist_min_folded: self.fist_min_folded,
            cursor: CursorMapping {
                scale_x: self.cursor_scale[0],
                scale_y: self.cursor_scale[1],
                offset_x: self.cursor_offset[0],
                offset_y: self.cursor_offset[1],
            },
        }
    }

    pub fn mode(&self) -> PetalResult<ModeConfig> {
        Ok(ModeConfig {
            stabilizer: StabilizerConfig {
                threshold: self.confidence_threshold,
            },
            content_pool: ContentPool::new(self.content_pool.iter().cloned())?,
        })
    }

    pub fn reveal(&self) -> RevealConfig {
        RevealConfig {
            pending_delay: Duration::from_millis(self.pending_delay_ms),
            shown_duration: Duration::from_millis(self.shown_duration_ms),
        }
    }

    pub fn overlay(&self) -> OverlayConfig {
        OverlayConfig {
            content_delay: Duration::from_millis(self.overlay_content_delay_ms),
        }
    }
}
