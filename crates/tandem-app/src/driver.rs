//! Driver trait for abstracting I/O operations.
//!
//! The [`Driver`] trait decouples the runtime from the host: a browser shell,
//! a terminal, or a simulation in tests. Each host implements the trait and
//! the generic [`crate::Runtime`] handles all orchestration.

use std::future::Future;

use tandem_core::Timestamp;

use crate::{Session, UserIntent};

/// Input the driver hands to the runtime.
#[derive(Debug, Clone, PartialEq)]
pub enum DriverInput {
    /// Text frame from the relay.
    Relay(String),
    /// The relay connection closed.
    RelayClosed,
    /// Something the user did.
    User(UserIntent),
    /// Shut the runtime down.
    Quit,
}

/// Abstracts I/O operations for the session runtime.
///
/// # Associated Types
///
/// - [`Error`](Driver::Error): Platform-specific error type
/// - [`Instant`](Driver::Instant): Time representation (real or virtual)
pub trait Driver: Send {
    /// Platform-specific error type.
    type Error: std::error::Error + Send + 'static;

    /// Time instant type. Enables virtual time in simulation.
    type Instant: Timestamp;

    /// Wait for the next relay frame or user intent.
    ///
    /// Must be cancel-safe: the runtime races it against crypto completions
    /// and the clock tick.
    ///
    /// # Errors
    ///
    /// Returns an error if the input source fails.
    fn next_input(&mut self) -> impl Future<Output = Result<DriverInput, Self::Error>> + Send;

    /// Write a text frame to the relay.
    ///
    /// # Errors
    ///
    /// Returns an error if the connection is closed or send fails.
    fn send_text(&mut self, text: String) -> impl Future<Output = Result<(), Self::Error>> + Send;

    /// Current time instant.
    fn now(&self) -> Self::Instant;

    /// Render the session model.
    ///
    /// # Errors
    ///
    /// Returns an error if rendering fails.
    fn render(&mut self, session: &Session<Self::Instant>) -> Result<(), Self::Error>;

    /// Set the visible path.
    fn navigate(&mut self, path: &str);

    /// Restart the handshake progress animation.
    fn reset_animation(&mut self);

    /// Scroll the message pane to the newest message.
    fn scroll_to_bottom(&mut self);

    /// Close the relay connection and clean up resources.
    fn stop(&mut self);
}
