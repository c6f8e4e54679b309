//! Session layer for Tandem
//!
//! Pure session orchestrator and generic runtime for the client side of a
//! two-party encrypted chat, so the same code runs in the host and in
//! deterministic tests.
//!
//! # Components
//!
//! - [`Session`]: orchestrator (relay decoding, composer, typing pings,
//!   scroll tracking, message log)
//! - [`KeyAgent`]: trait for the asynchronous crypto collaborator
//! - [`Driver`]: trait for platform-specific I/O abstraction
//! - [`Runtime`]: generic event loop using Driver and KeyAgent
//! - `relay` (feature `transport`): WebSocket connection to the relay

#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod action;
mod agent;
mod driver;
mod event;
#[cfg(feature = "transport")]
pub mod relay;
mod runtime;
mod session;
mod state;

pub use action::SessionAction;
pub use agent::KeyAgent;
pub use driver::{Driver, DriverInput};
pub use event::{CryptoResult, SessionEvent, UserIntent};
pub use runtime::Runtime;
pub use session::{DECODE_ERROR, SEND_DROPPED, Session};
pub use state::{Device, Message, Notice, SessionFlags};
