//! Inbound relay messages.
//!
//! The relay sends one JSON object per text frame, tagged by `type`:
//!
//! ```text
//! {"type":"waiting","peerConnId":"..","chatId":".."}
//! {"type":"receiveAId","connId":".."}
//! {"type":"payload","body":<Payload>}
//! {"type":"error","message":".."}
//! {"type":"roomUnavailable"}
//! ```
//!
//! Relayed peer payloads are flattened into [`SocketMessage`] so the session
//! layer matches on a single enum.

use serde::{Deserialize, Serialize};

use crate::{
    ChatId, ConnId, Payload, PublicKeyRecord,
    errors::{CodecError, Result},
};

/// A decoded relay message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SocketMessage {
    /// A joiner connected to the creator's chat.
    Waiting {
        /// Joiner's connection id.
        peer: ConnId,
        /// Chat the joiner asked for.
        chat_id: ChatId,
    },
    /// Joiner learns the creator's connection id.
    ReceiveAId(ConnId),
    /// Encrypted chat message from the peer.
    ReceiveMessage(String),
    /// Peer's exported public key.
    Key(PublicKeyRecord),
    /// Peer is typing.
    Typing,
    /// Relay-reported error.
    Error(String),
    /// The requested chat does not exist or is full.
    RoomUnavailable,
}

/// Wire form of [`SocketMessage`].
#[derive(Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
enum Envelope {
    #[serde(rename_all = "camelCase")]
    Waiting { peer_conn_id: ConnId, chat_id: ChatId },
    #[serde(rename_all = "camelCase")]
    ReceiveAId { conn_id: ConnId },
    Payload { body: Payload },
    Error { message: String },
    RoomUnavailable,
}

impl From<Envelope> for SocketMessage {
    fn from(envelope: Envelope) -> Self {
        match envelope {
            Envelope::Waiting { peer_conn_id, chat_id } => {
                Self::Waiting { peer: peer_conn_id, chat_id }
            },
            Envelope::ReceiveAId { conn_id } => Self::ReceiveAId(conn_id),
            Envelope::Payload { body } => Self::relayed(body),
            Envelope::Error { message } => Self::Error(message),
            Envelope::RoomUnavailable => Self::RoomUnavailable,
        }
    }
}

impl From<SocketMessage> for Envelope {
    fn from(message: SocketMessage) -> Self {
        match message {
            SocketMessage::Waiting { peer, chat_id } => Self::Waiting { peer_conn_id: peer, chat_id },
            SocketMessage::ReceiveAId(conn_id) => Self::ReceiveAId { conn_id },
            SocketMessage::ReceiveMessage(ciphertext) => {
                Self::Payload { body: Payload::Message(ciphertext) }
            },
            SocketMessage::Key(key) => Self::Payload { body: Payload::Key(key) },
            SocketMessage::Typing => Self::Payload { body: Payload::Typing },
            SocketMessage::Error(message) => Self::Error { message },
            SocketMessage::RoomUnavailable => Self::RoomUnavailable,
        }
    }
}

impl SocketMessage {
    /// Message the peer sees when the relay delivers `body`.
    pub fn relayed(body: Payload) -> Self {
        match body {
            Payload::Typing => Self::Typing,
            Payload::Message(ciphertext) => Self::ReceiveMessage(ciphertext),
            Payload::Key(key) => Self::Key(key),
        }
    }

    /// Relayed payload carried by this message. `None` for relay-originated
    /// messages.
    pub fn body(&self) -> Option<Payload> {
        match self {
            Self::Typing => Some(Payload::Typing),
            Self::ReceiveMessage(ciphertext) => Some(Payload::Message(ciphertext.clone())),
            Self::Key(key) => Some(Payload::Key(key.clone())),
            Self::Waiting { .. } | Self::ReceiveAId(_) | Self::Error(_) | Self::RoomUnavailable => {
                None
            },
        }
    }

    /// Short tag naming the message kind, for logs.
    pub fn tag(&self) -> &'static str {
        match self {
            Self::Waiting { .. } => "waiting",
            Self::ReceiveAId(_) => "receive_a_id",
            Self::ReceiveMessage(_) => "receive_message",
            Self::Key(_) => "key",
            Self::Typing => "typing",
            Self::Error(_) => "error",
            Self::RoomUnavailable => "room_unavailable",
        }
    }

    /// Serialize as the relay would send it.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(&Envelope::from(self.clone())).map_err(CodecError::Encode)
    }
}

/// Decode one relay text frame.
pub fn decode(text: &str) -> Result<SocketMessage> {
    serde_json::from_str::<Envelope>(text).map(SocketMessage::from).map_err(CodecError::Malformed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_waiting() {
        let msg = decode(r#"{"type":"waiting","peerConnId":"b-9","chatId":"c-1"}"#).unwrap();
        assert_eq!(msg, SocketMessage::Waiting {
            peer: ConnId::new("b-9"),
            chat_id: ChatId::new("c-1"),
        });
    }

    #[test]
    fn decodes_receive_a_id() {
        let msg = decode(r#"{"type":"receiveAId","connId":"a-3"}"#).unwrap();
        assert_eq!(msg, SocketMessage::ReceiveAId(ConnId::new("a-3")));
    }

    #[test]
    fn decodes_relayed_payloads() {
        assert_eq!(decode(r#"{"type":"payload","body":"TYPING"}"#).unwrap(), SocketMessage::Typing);
        assert_eq!(
            decode(r#"{"type":"payload","body":{"message":"xx"}}"#).unwrap(),
            SocketMessage::ReceiveMessage("xx".into())
        );
        let key = decode(
            r#"{"type":"payload","body":{"key":{"alg":"A","e":"E","key_ops":[],"n":"N","kty":"K"}}}"#,
        )
        .unwrap();
        assert!(matches!(key, SocketMessage::Key(ref k) if k.n == "N"));
    }

    #[test]
    fn decodes_error_and_room_unavailable() {
        assert_eq!(
            decode(r#"{"type":"error","message":"nope"}"#).unwrap(),
            SocketMessage::Error("nope".into())
        );
        assert_eq!(decode(r#"{"type":"roomUnavailable"}"#).unwrap(), SocketMessage::RoomUnavailable);
    }

    #[test]
    fn malformed_text_is_an_error_not_a_panic() {
        for text in ["", "null", "[]", "{}", r#"{"type":"bogus"}"#, r#"{"type":"payload","body":"PING"}"#]
        {
            assert!(matches!(decode(text), Err(CodecError::Malformed(_))), "{text}");
        }
    }

    #[test]
    fn relay_form_json() {
        let msg = SocketMessage::Waiting { peer: ConnId::new("b"), chat_id: ChatId::new("c") };
        insta::assert_snapshot!(
            msg.to_json().unwrap(),
            @r#"{"type":"waiting","peerConnId":"b","chatId":"c"}"#
        );
    }
}
