//! Confidence Stabilizer - hysteresis over a noisy boolean
//!
//! Qualifying frames push the counter up by one, anything else pulls it down
//! by one. The output is stable once the counter reaches the threshold, so
//! starting a selection needs `threshold` qualifying frames in a row, while a
//! single dropped frame during a held pinch only costs one step.

/// Stabilizer configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StabilizerConfig {
    /// Consecutive qualifying frames needed before the output turns true
    pub threshold: u32,
}

impl Default for StabilizerConfig {
    fn default() -> Self {
        Self { threshold: 3 }
    }
}

impl StabilizerConfig {
    /// Upper bound of the counter
    pub fn ceiling(&self) -> u32 {
        self.threshold.saturating_add(1)
    }
}

/// Bounded confidence counter
#[derive(Debug, Clone)]
pub struct ConfidenceStabilizer {
    config: StabilizerConfig,
    counter: u32,
}

impl ConfidenceStabilizer {
    pub fn new(config: StabilizerConfig) -> Self {
        Self { config, counter: 0 }
    }

    /// Feed one frame. Returns the stable output after the update.
    pub fn update(&mut self, qualifies: bool) -> bool {
        self.counter = if qualifies {
            self.counter.saturating_add(1).min(self.config.ceiling())
        } else {
            self.counter.saturating_sub(1)
        };
        self.is_stable()
    }

    /// Stable output
    pub fn is_stable(&self) -> bool {
        self.counter >= self.config.threshold
    }

    pub fn counter(&self) -> u32 {
        self.counter
    }

    pub fn config(&self) -> &StabilizerConfig {
        &self.config
    }

    /// Drop all accumulated evidence
    pub fn reset(&mut self) {
        self.counter = 0;
    }
}

impl Default for ConfidenceStabilizer {
    fn default() -> Self {
        Self::new(StabilizerConfig::default())
    }
}
