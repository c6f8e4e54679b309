//! Session timing and layout thresholds.

use std::time::Duration;

/// Minimum spacing between outbound typing pings.
pub const DEFAULT_TYPING_INTERVAL: Duration = Duration::from_millis(4000);

/// Scroll samples closer together than this are coalesced.
pub const DEFAULT_SCROLL_SETTLE: Duration = Duration::from_millis(50);

/// Distance from the bottom, in pixels, still considered "at the bottom".
pub const DEFAULT_NEAR_BOTTOM_MARGIN: f64 = 100.0;

/// Period of the clock tick that advances session time.
pub const DEFAULT_TICK_INTERVAL: Duration = Duration::from_millis(25);

/// Path the host is asked to show once a chat id segment is no longer valid.
pub const ROOT_PATH: &str = "/";

/// Session configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionConfig {
    /// Minimum spacing between outbound typing pings.
    pub typing_interval: Duration,
    /// Scroll settling window.
    pub scroll_settle: Duration,
    /// Near-bottom margin in pixels.
    pub near_bottom_margin: f64,
    /// Clock tick period (should be well below `scroll_settle`).
    pub tick_interval: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            typing_interval: DEFAULT_TYPING_INTERVAL,
            scroll_settle: DEFAULT_SCROLL_SETTLE,
            near_bottom_margin: DEFAULT_NEAR_BOTTOM_MARGIN,
            tick_interval: DEFAULT_TICK_INTERVAL,
        }
    }
}
