//! Tandem wire protocol
//!
//! JSON codec for the text frames exchanged with the signaling relay, plus the
//! scroll payload reported by the host UI.
//!
//! # Frames
//!
//! - [`SocketMessage`]: everything the relay can deliver to a client, decoded
//!   from a `type`-tagged JSON object.
//! - [`OutboundFrame`]: a peer-addressed `{to, body}` envelope the relay
//!   forwards verbatim to the connection named by `to`.
//! - [`ControlFrame`]: requests addressed to the relay itself.
//!
//! Decoding never panics. Malformed text surfaces as [`CodecError`] and the
//! caller decides whether to drop it.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod errors;
mod frame;
mod ids;
mod key;
mod message;
mod scroll;

pub use errors::{CodecError, Result};
pub use frame::{ControlFrame, Outbound, OutboundFrame, Payload, TYPING_MARKER, encode};
pub use ids::{ChatId, ConnId};
pub use key::PublicKeyRecord;
pub use message::{SocketMessage, decode};
pub use scroll::ScrollEvent;
