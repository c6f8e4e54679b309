//! Outbound frames.
//!
//! Peer-addressed traffic travels as `{"to": <ConnId>, "body": <payload>}`.
//! The relay strips the envelope and delivers `body` to the addressed
//! connection, so the payload shape is the contract between the two peers.
//!
//! # Payload shapes
//!
//! | Payload | JSON |
//! |---|---|
//! | [`Payload::Typing`] | `"TYPING"` |
//! | [`Payload::Message`] | `{"message": "<ciphertext>"}` |
//! | [`Payload::Key`] | `{"key": {<PublicKeyRecord>}}` |

use serde::{Deserialize, Serialize};

use crate::{
    ChatId, ConnId, PublicKeyRecord,
    errors::{CodecError, Result},
};

/// Bare-string payload announcing that the sender is typing.
pub const TYPING_MARKER: &str = "TYPING";

/// Body of a peer-addressed frame.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawPayload", into = "RawPayload")]
pub enum Payload {
    /// Typing notification.
    Typing,
    /// Encrypted chat message.
    Message(String),
    /// Sender's exported public key.
    Key(PublicKeyRecord),
}

/// Untagged JSON form of [`Payload`]. Variant order decides match priority.
#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum RawPayload {
    Marker(String),
    Message { message: String },
    Key { key: PublicKeyRecord },
}

impl From<Payload> for RawPayload {
    fn from(payload: Payload) -> Self {
        match payload {
            Payload::Typing => Self::Marker(TYPING_MARKER.to_string()),
            Payload::Message(message) => Self::Message { message },
            Payload::Key(key) => Self::Key { key },
        }
    }
}

impl TryFrom<RawPayload> for Payload {
    type Error = CodecError;

    fn try_from(raw: RawPayload) -> Result<Self> {
        match raw {
            RawPayload::Marker(marker) if marker == TYPING_MARKER => Ok(Self::Typing),
            RawPayload::Marker(marker) => Err(CodecError::UnknownMarker(marker)),
            RawPayload::Message { message } => Ok(Self::Message(message)),
            RawPayload::Key { key } => Ok(Self::Key(key)),
        }
    }
}

/// Peer-addressed frame routed by the relay.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutboundFrame {
    /// Connection the relay should deliver `body` to.
    pub to: ConnId,
    /// Payload delivered to the peer.
    pub body: Payload,
}

impl OutboundFrame {
    /// Serialize to relay text.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(self).map_err(CodecError::Encode)
    }

    /// Parse relay text produced by [`OutboundFrame::to_json`].
    pub fn from_json(text: &str) -> Result<Self> {
        serde_json::from_str(text).map_err(CodecError::Malformed)
    }
}

/// Wrap `body` for delivery to `to`.
pub fn encode(to: ConnId, body: Payload) -> OutboundFrame {
    OutboundFrame { to, body }
}

/// Request addressed to the relay itself rather than to a peer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ControlFrame {
    /// Joiner announces it is waiting in `chat_id`. The relay answers with
    /// the creator's connection id and notifies the creator.
    #[serde(rename_all = "camelCase")]
    Join {
        /// Chat the joiner wants to enter.
        chat_id: ChatId,
    },
}

impl ControlFrame {
    /// Parse relay text produced by [`Outbound::to_json`].
    pub fn from_json(text: &str) -> Result<Self> {
        serde_json::from_str(text).map_err(CodecError::Malformed)
    }
}

/// Any frame the client writes to the relay socket.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outbound {
    /// Frame forwarded to a peer.
    Peer(OutboundFrame),
    /// Request handled by the relay.
    Control(ControlFrame),
}

impl Outbound {
    /// Serialize to relay text.
    pub fn to_json(&self) -> Result<String> {
        match self {
            Self::Peer(frame) => frame.to_json(),
            Self::Control(control) => serde_json::to_string(control).map_err(CodecError::Encode),
        }
    }

    /// Peer this frame is addressed to. `None` for control frames.
    pub fn recipient(&self) -> Option<&ConnId> {
        match self {
            Self::Peer(frame) => Some(&frame.to),
            Self::Control(_) => None,
        }
    }
}

impl From<OutboundFrame> for Outbound {
    fn from(frame: OutboundFrame) -> Self {
        Self::Peer(frame)
    }
}

impl From<ControlFrame> for Outbound {
    fn from(control: ControlFrame) -> Self {
        Self::Control(control)
    }
}
