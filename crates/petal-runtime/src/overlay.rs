//! Overlay presenter - delayed content reveal inside a visible overlay
//!
//! The overlay frame appears as soon as the reveal sequencer shows it; its
//! content follows after a fixed delay. Hiding the overlay hides the content
//! at once and drops the pending content deadline.

use std::time::Duration;

use petal_core::MonoTime;
use petal_time::Deadline;

/// Presenter configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OverlayConfig {
    /// Delay between the overlay appearing and its content appearing
    pub content_delay: Duration,
}

impl Default for OverlayConfig {
    fn default() -> Self {
        Self {
            content_delay: Duration::from_millis(1200),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct OverlayPresenter {
    config: OverlayConfig,
    overlay_visible: bool,
    content_visible: bool,
    content: Deadline,
}

impl OverlayPresenter {
    pub fn new(config: OverlayConfig) -> Self {
        Self {
            config,
            ..Default::default()
        }
    }

    pub fn is_overlay_visible(&self) -> bool {
        self.overlay_visible
    }

    pub fn is_content_visible(&self) -> bool {
        self.content_visible
    }

    pub fn next_deadline(&self) -> Option<MonoTime> {
        self.content.due()
    }

    /// Follow the overlay visibility. Returns the new content visibility if
    /// it changed.
    pub fn set_overlay_visible(&mut self, visible: bool, at: MonoTime) -> Option<bool> {
        if visible == self.overlay_visible {
            return None;
        }
        self.overlay_visible = visible;

        if visible {
            self.content.arm(at, self.config.content_delay);
            None
        } else {
            self.content.cancel();
            self.hide_content()
        }
    }

    /// Fire the content deadline if due. Returns `Some(true)` when content appears.
    pub fn poll(&mut self, now: MonoTime) -> Option<bool> {
        self.content.fire_if_due(now)?;
        if self.content_visible {
            return None;
        }
        self.content_visible = true;
        Some(true)
    }

    /// Hide everything and drop the deadline
    pub fn shutdown(&mut self) -> Option<bool> {
        self.overlay_visible = false;
        self.content.cancel();
        self.hide_content()
    }

    fn hide_content(&mut self) -> Option<bool> {
        if self.content_visible {
            self.content_visible = false;
            Some(false)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(v: u64) -> MonoTime {
        MonoTime::from_millis(v)
    }

    #[test]
    fn test_content_follows_after_delay() {
        let mut p = OverlayPresenter::default();
        assert_eq!(p.set_overlay_visible(true, ms(2000)), None);
        assert_eq!(p.next_deadline(), Some(ms(3200)));

        assert_eq!(p.poll(ms(3199)), None);
        assert_eq!(p.poll(ms(3200)), Some(true));
        assert!(p.is_content_visible());
        assert_eq!(p.poll(ms(5000)), None);
    }

    #[test]
    fn test_hide_before_content() {
        let mut p = OverlayPresenter::default();
        p.set_overlay_visible(true, ms(0));
        assert_eq!(p.set_overlay_visible(false, ms(500)), None);
        assert_eq!(p.next_deadline(), None);
        assert_eq!(p.poll(ms(2000)), None);
        assert!(!p.is_content_visible());
    }

    #[test]
    fn test_hide_after_content() {
        let mut p = OverlayPresenter::default();
        p.set_overlay_visible(true, ms(0));
        p.poll(ms(1200));
        assert_eq!(p.set_overlay_visible(false, ms(3000)), Some(false));
        assert!(!p.is_overlay_visible());
    }

    #[test]
    fn test_repeated_visibility_is_ignored() {
        let mut p = OverlayPresenter::default();
        p.set_overlay_visible(true, ms(0));
        // A second "visible" must not push the content deadline back
        p.set_overlay_visible(true, ms(1000));
        assert_eq!(p.next_deadline(), Some(ms(1200)));
    }

    #[test]
    fn test_shutdown() {
        let mut p = OverlayPresenter::default();
        p.set_overlay_visible(true, ms(0));
        p.poll(ms(1200));
        assert_eq!(p.shutdown(), Some(false));
        assert_eq!(p.shutdown(), None);
        assert_eq!(p.next_deadline(), None);
    }
}
