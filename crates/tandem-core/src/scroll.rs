//! Scroll-position debouncer.
//!
//! Momentum scrolling fires measurements far faster than the UI needs. The
//! tracker samples at most once per settling window and collapses back to
//! [`ScrollStatus::Static`] once two samples report the same offset.
//!
//! Measurements inside the window do not advance the sample, but the
//! scroll-to-bottom flag always reflects the latest one so the settled
//! position is never lost.

use std::time::Duration;

use tandem_proto::ScrollEvent;

use crate::Timestamp;

/// Whether the pane is being scrolled.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ScrollStatus<I> {
    /// No scrolling in progress.
    Static,
    /// Scrolling; last sample taken at `at` with offset `scroll_top`.
    Moving {
        /// Time of the last sample.
        at: I,
        /// Offset of the last sample.
        scroll_top: f64,
    },
}

/// Scroll debouncer driving the scroll-to-bottom affordance.
#[derive(Debug, Clone)]
pub struct ScrollTracker<I> {
    status: ScrollStatus<I>,
    settle: Duration,
    margin: f64,
}

impl<I: Timestamp> ScrollTracker<I> {
    /// Create a tracker with the given settling window and near-bottom margin.
    pub fn new(settle: Duration, margin: f64) -> Self {
        Self { status: ScrollStatus::Static, settle, margin }
    }

    /// Current scroll status.
    pub fn status(&self) -> ScrollStatus<I> {
        self.status
    }

    /// Feed one measurement taken at `now`.
    ///
    /// Returns whether the scroll-to-bottom arrow should be shown.
    pub fn observe(&mut self, event: ScrollEvent, now: I) -> bool {
        let show_arrow = !event.is_near_bottom(self.margin);

        match self.status {
            ScrollStatus::Static => {
                self.status = ScrollStatus::Moving { at: now, scroll_top: event.scroll_top };
            },
            ScrollStatus::Moving { at, scroll_top } if now - at > self.settle => {
                #[allow(clippy::float_cmp, reason = "offsets are copied from the DOM, not computed")]
                let settled = event.scroll_top == scroll_top;
                self.status = if settled {
                    ScrollStatus::Static
                } else {
                    ScrollStatus::Moving { at: now, scroll_top: event.scroll_top }
                };
            },
            // Coalesced: the sample stays put until the window elapses.
            ScrollStatus::Moving { .. } => {},
        }

        show_arrow
    }
}
