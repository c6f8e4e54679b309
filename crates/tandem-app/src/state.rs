//! Observable session state.
//!
//! The data structures the host renders from: the message log, the
//! user-facing notice and the flags the session was started with. None of
//! them expose key material.

use tandem_proto::ChatId;

/// A message in the log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    /// Whether this client wrote it.
    pub own: bool,
    /// Plaintext.
    pub content: String,
}

/// Device class, used by the host to pick a layout.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Device {
    /// Pointer and wide screen.
    #[default]
    Desktop,
    /// Touch screen.
    Mobile,
}

/// Something the user should be told about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Notice {
    /// The invite points at a chat that is full or gone.
    RoomUnavailable,
    /// The relay connection closed.
    ConnectionLost,
}

impl Notice {
    /// Text for the host UI.
    pub fn text(self) -> &'static str {
        match self {
            Self::RoomUnavailable => "That chat is no longer available.",
            Self::ConnectionLost => "Connection to the relay was lost.",
        }
    }
}

/// Flags the host starts the session with.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionFlags {
    /// Chat id from the invite link path. `None` when starting fresh.
    pub chat_id: Option<ChatId>,
    /// Page origin, used to build invite links.
    pub origin: String,
    /// Relay WebSocket URL.
    pub relay_url: String,
    /// REST endpoint URL.
    pub rest_url: String,
    /// Whether the host can invoke a native share sheet.
    pub share_enabled: bool,
    /// Whether the host can write to the clipboard.
    pub copy_enabled: bool,
    /// Device class.
    pub device: Device,
}
