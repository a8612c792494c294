//! Scroll sample tracking and the debounced "finished scrolling" signal.
//!
//! The host feeds `(offset, content_height, viewport_height)` samples as the
//! view scrolls or resizes. The tracker is a pure function of the latest
//! sample plus a settle deadline; time is passed in explicitly so the
//! debounce is testable without sleeping. Offsets are measured from the top
//! of the content in whatever unit the host view uses.

#[cfg(test)]
#[path = "scroll_test.rs"]
mod scroll_test;

use std::time::{Duration, Instant};

/// One scroll observation from the host view.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScrollSample {
    /// Distance scrolled from the top of the content.
    pub offset: f64,
    /// Total content height.
    pub content_height: f64,
    /// Visible viewport height.
    pub viewport_height: f64,
}

/// Debounced scroll observer.
///
/// A view with no sample yet counts as at-bottom: an empty or freshly shown
/// list is anchored to the newest message.
#[derive(Clone, Debug)]
pub struct ScrollTracker {
    last: Option<ScrollSample>,
    settle_deadline: Option<Instant>,
    settle_window: Duration,
    near_bottom_tolerance: f64,
}

impl ScrollTracker {
    #[must_use]
    pub fn new(settle_window: Duration, near_bottom_tolerance: f64) -> Self {
        Self {
            last: None,
            settle_deadline: None,
            settle_window,
            near_bottom_tolerance,
        }
    }

    /// Record a sample and restart the settle timer.
    pub fn record_at(&mut self, sample: ScrollSample, now: Instant) {
        self.last = Some(sample);
        self.settle_deadline = Some(now + self.settle_window);
    }

    /// Deadline at which the current gesture counts as settled, if a gesture
    /// is pending evaluation.
    #[must_use]
    pub fn settle_deadline(&self) -> Option<Instant> {
        self.settle_deadline
    }

    /// Whether the user has finished scrolling as of `now`: no sample has
    /// arrived within the settle window.
    #[must_use]
    pub fn is_settled_at(&self, now: Instant) -> bool {
        self.settle_deadline.is_none_or(|deadline| now >= deadline)
    }

    /// Clear the settle timer once it has been acted on.
    pub fn clear_settle(&mut self) {
        self.settle_deadline = None;
    }

    /// Distance between the bottom edge of the viewport and the bottom of
    /// the content, clamped to zero.
    #[must_use]
    pub fn distance_from_bottom(&self) -> f64 {
        self.last
            .map_or(0.0, |s| (s.content_height - s.viewport_height - s.offset).max(0.0))
    }

    /// Distance scrolled from the top of the content.
    #[must_use]
    pub fn distance_from_top(&self) -> f64 {
        self.last.map_or(0.0, |s| s.offset.max(0.0))
    }

    /// Whether the viewport sits within the near-bottom tolerance.
    #[must_use]
    pub fn is_near_bottom(&self) -> bool {
        self.distance_from_bottom() <= self.near_bottom_tolerance
    }
}
