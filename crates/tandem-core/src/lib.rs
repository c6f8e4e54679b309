//! Tandem session core
//!
//! Pure state machines for the client side of a two-party encrypted chat.
//! Nothing here performs I/O or cryptography: callers feed inputs together
//! with the current time and execute the returned [`Effect`]s.
//!
//! # Components
//!
//! - [`Handshake`]: key-exchange status machine (create/join, key swap,
//!   message exchange)
//! - [`TypingThrottle`]: bounds outbound typing pings
//! - [`ScrollTracker`]: coalesces scroll measurements into the
//!   scroll-to-bottom affordance
//! - [`SessionConfig`]: timing and layout thresholds

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod clock;
pub mod config;
pub mod error;
pub mod handshake;
pub mod scroll;
pub mod status;
pub mod typing;

pub use clock::Timestamp;
pub use config::SessionConfig;
pub use error::ProtocolViolation;
pub use handshake::{Effect, Handshake, HandshakeInput};
pub use scroll::{ScrollStatus, ScrollTracker};
pub use status::{Role, Status, TypingStatus};
pub use typing::TypingThrottle;
