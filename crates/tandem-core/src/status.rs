//! Handshake status.
//!
//! Each variant carries exactly the data valid in that state, so a peer id
//! can only be read once one has been learned.
//!
//! # Paths
//!
//! ```text
//! A (creator):  Start ─create─> Joining(Creator) ─key─> WaitingForAId
//!                 ─Waiting─> WaitingForBKey ─Key─> Importing ─imported─> Ready
//!
//! B (joiner):   Start ─join─> Joining(Joiner) ─key─> Joining(Joiner, key)
//!                 ─ReceiveAId─> WaitingForAKey ─Key─> Importing ─imported─> Ready
//! ```
//!
//! Room-unavailable and connection loss are the only ways back to `Start`.

use tandem_proto::{ChatId, ConnId, PublicKeyRecord};

/// Which side of the chat this client plays while joining.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Role {
    /// A: created the chat.
    Creator {
        /// Chat id minted for the new room.
        chat_id: ChatId,
    },
    /// B: joining a chat from an invite.
    Joiner {
        /// Chat being joined.
        chat_id: ChatId,
        /// Own exported key. `None` until the export completes.
        my_key: Option<PublicKeyRecord>,
    },
}

/// Whether the peer is currently typing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypingStatus<I> {
    /// No typing notification since the last message.
    NotTyping,
    /// Peer sent a typing ping at `since`.
    IsTyping {
        /// Session time the ping arrived.
        since: I,
    },
}

/// Session handshake status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Status<I> {
    /// No handshake begun.
    Start,
    /// Own key export requested.
    Joining(Role),
    /// A: key exported, waiting for a joiner to connect.
    WaitingForAId {
        /// Own exported key.
        my_key: PublicKeyRecord,
        /// Chat the invite link points at.
        chat_id: ChatId,
    },
    /// A: joiner connected, waiting for its key.
    WaitingForBKey {
        /// Own exported key.
        my_key: PublicKeyRecord,
        /// Joiner's connection.
        peer: ConnId,
        /// Chat the joiner asked for.
        chat_id: ChatId,
    },
    /// B: own key sent, waiting for the creator's key.
    WaitingForAKey {
        /// Creator's connection.
        peer: ConnId,
    },
    /// Peer key import in flight.
    Importing {
        /// Peer connection, bound for the rest of the session.
        peer: ConnId,
    },
    /// Handshake complete; messages flow.
    Ready {
        /// Peer connection.
        peer: ConnId,
        /// Peer typing indicator.
        typing: TypingStatus<I>,
    },
}

impl<I> Status<I> {
    /// Short name for logs.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::Joining(Role::Creator { .. }) => "joining_as_creator",
            Self::Joining(Role::Joiner { .. }) => "joining_as_joiner",
            Self::WaitingForAId { .. } => "waiting_for_a_id",
            Self::WaitingForBKey { .. } => "waiting_for_b_key",
            Self::WaitingForAKey { .. } => "waiting_for_a_key",
            Self::Importing { .. } => "importing",
            Self::Ready { .. } => "ready",
        }
    }

    /// Peer connection once the handshake is complete.
    pub fn ready_peer(&self) -> Option<&ConnId> {
        match self {
            Self::Ready { peer, .. } => Some(peer),
            _ => None,
        }
    }

    /// Chat this handshake belongs to, while one is known.
    ///
    /// Only the pre-pairing states carry it; from `WaitingForAKey` on, the
    /// peer connection identifies the chat.
    pub fn chat_id(&self) -> Option<&ChatId> {
        match self {
            Self::Joining(Role::Creator { chat_id } | Role::Joiner { chat_id, .. })
            | Self::WaitingForAId { chat_id, .. }
            | Self::WaitingForBKey { chat_id, .. } => Some(chat_id),
            _ => None,
        }
    }

    /// Whether messages can be exchanged.
    pub fn is_ready(&self) -> bool {
        matches!(self, Self::Ready { .. })
    }

    /// Whether a handshake is underway (neither `Start` nor `Ready`).
    pub fn is_handshaking(&self) -> bool {
        !matches!(self, Self::Start | Self::Ready { .. })
    }

    /// Whether the peer is typing.
    pub fn peer_is_typing(&self) -> bool {
        matches!(self, Self::Ready { typing: TypingStatus::IsTyping { .. }, .. })
    }

    /// Label for the host UI.
    ///
    /// Several protocol states share a label; this is the coarse vocabulary
    /// the chat screen shows, not a separate protocol path.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Start => "Start a chat or join one",
            Self::Joining(_) => "Generating keys",
            Self::WaitingForAId { .. } => "Waiting for someone to join",
            Self::WaitingForBKey { .. } | Self::WaitingForAKey { .. } | Self::Importing { .. } => {
                "Exchanging keys"
            },
            Self::Ready { .. } => "Connected",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    type S = Status<u64>;

    #[test]
    fn only_ready_exposes_peer() {
        let peer = ConnId::new("p");
        assert_eq!(S::Importing { peer: peer.clone() }.ready_peer(), None);
        assert_eq!(S::WaitingForAKey { peer: peer.clone() }.ready_peer(), None);

        let ready = S::Ready { peer: peer.clone(), typing: TypingStatus::NotTyping };
        assert_eq!(ready.ready_peer(), Some(&peer));
        assert!(!ready.is_handshaking());
        assert!(!S::Start.is_handshaking());
        assert!(S::Joining(Role::Creator { chat_id: ChatId::new("c") }).is_handshaking());
    }

    #[test]
    fn chat_id_known_until_paired() {
        let chat = ChatId::new("c");
        let my_key = PublicKeyRecord {
            alg: "RSA-OAEP-256".into(),
            e: "AQAB".into(),
            key_ops: vec![],
            n: "n".into(),
            kty: "RSA".into(),
            ext: None,
        };

        assert_eq!(S::Joining(Role::Creator { chat_id: chat.clone() }).chat_id(), Some(&chat));
        assert_eq!(S::WaitingForAId { my_key, chat_id: chat.clone() }.chat_id(), Some(&chat));
        assert_eq!(S::WaitingForAKey { peer: ConnId::new("a") }.chat_id(), None);
        assert_eq!(S::Start.chat_id(), None);
    }

    #[test]
    fn typing_flag() {
        let peer = ConnId::new("p");
        assert!(!S::Ready { peer: peer.clone(), typing: TypingStatus::NotTyping }.peer_is_typing());
        assert!(S::Ready { peer, typing: TypingStatus::IsTyping { since: 5 } }.peer_is_typing());
    }
}
