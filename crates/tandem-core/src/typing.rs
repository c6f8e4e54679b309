//! Outbound typing-ping throttle.
//!
//! Every keystroke is a candidate ping, but at most one ping leaves per
//! interval regardless of keystroke rate. The interval is independent of how
//! long the peer displays the indicator.

use std::time::Duration;

use crate::Timestamp;

/// Rate limiter for typing notifications.
#[derive(Debug, Clone)]
pub struct TypingThrottle<I> {
    interval: Duration,
    last_ping: Option<I>,
}

impl<I: Timestamp> TypingThrottle<I> {
    /// Create a throttle that allows one ping per `interval`.
    pub fn new(interval: Duration) -> Self {
        Self { interval, last_ping: None }
    }

    /// Decide whether a keystroke at `now` should send a ping.
    ///
    /// Records `now` as the last ping time when it returns `true`.
    pub fn try_ping(&mut self, now: I) -> bool {
        let due = match self.last_ping {
            None => true,
            Some(last) => now - last > self.interval,
        };
        if due {
            self.last_ping = Some(now);
        }
        due
    }

    /// Time of the last ping sent. `None` if none was sent.
    pub fn last_ping(&self) -> Option<I> {
        self.last_ping
    }
}
