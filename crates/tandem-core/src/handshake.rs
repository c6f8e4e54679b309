//! Handshake state machine.
//!
//! Owns the session [`Status`] and is the only code that changes it. Each
//! input is matched against the current status. Valid pairs move the status
//! forward and return effects; every other pair leaves the status untouched
//! and returns a single [`Effect::Log`] tagged `oops`.
//!
//! Crypto completions arrive asynchronously and may interleave with relay
//! traffic, so a completion whose status has already moved on lands in the
//! same fallback instead of being treated as a fault.

use tandem_proto::{
    ChatId, ControlFrame, Outbound, Payload, PublicKeyRecord, SocketMessage, encode,
};

use crate::{
    Timestamp,
    config::ROOT_PATH,
    error::ProtocolViolation,
    status::{Role, Status, TypingStatus},
};

/// Log tag used for mismatched status/input pairs.
pub const OOPS: &str = "oops";
/// Log tag: own key export failed; the handshake was abandoned.
pub const KEY_EXPORT_FAILED: &str = "key_export_failed";
/// Log tag: peer key import failed; the handshake was abandoned.
pub const KEY_IMPORT_FAILED: &str = "key_import_failed";
/// Log tag: the relay has no room for the requested chat.
pub const ROOM_UNAVAILABLE: &str = "room_unavailable";
/// Log tag: an incoming message could not be decrypted.
pub const DECRYPT_FAILED: &str = "decrypt_failed";
/// Log tag: an outgoing message could not be encrypted.
pub const ENCRYPT_FAILED: &str = "encrypt_failed";
/// Log tag: the relay reported an error.
pub const RELAY_ERROR: &str = "relay_error";
/// Log tag: the relay connection is gone.
pub const CONNECTION_LOST: &str = "connection_lost";

/// Inputs that can move the handshake.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HandshakeInput {
    /// User starts a new chat under a freshly minted id (becomes A).
    CreateChat(ChatId),
    /// User joins an existing chat (becomes B).
    JoinChat(ChatId),
    /// Own public key export finished.
    KeyExported(PublicKeyRecord),
    /// Own public key export failed.
    KeyExportFailed(String),
    /// Peer public key import finished.
    KeyImported,
    /// Peer public key import failed.
    KeyImportFailed(String),
    /// Decoded relay message.
    Relay(SocketMessage),
    /// User submitted a non-empty message.
    Submit(String),
    /// Outgoing message encrypted.
    Encrypted(String),
    /// Outgoing message could not be encrypted.
    EncryptFailed(String),
    /// Incoming message decrypted.
    Decrypted(String),
    /// Incoming message could not be decrypted.
    DecryptFailed(String),
    /// Relay connection is gone for good.
    ConnectionLost,
}

impl HandshakeInput {
    /// Short tag for logs.
    pub fn tag(&self) -> &'static str {
        match self {
            Self::CreateChat(_) => "create_chat",
            Self::JoinChat(_) => "join_chat",
            Self::KeyExported(_) => "key_exported",
            Self::KeyExportFailed(_) => KEY_EXPORT_FAILED,
            Self::KeyImported => "key_imported",
            Self::KeyImportFailed(_) => KEY_IMPORT_FAILED,
            Self::Relay(message) => message.tag(),
            Self::Submit(_) => "submit",
            Self::Encrypted(_) => "encrypted",
            Self::EncryptFailed(_) => ENCRYPT_FAILED,
            Self::Decrypted(_) => "decrypted",
            Self::DecryptFailed(_) => DECRYPT_FAILED,
            Self::ConnectionLost => CONNECTION_LOST,
        }
    }
}

/// Side effects requested by a transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Write a frame to the relay.
    Send(Outbound),
    /// Ask the crypto collaborator to export the own public key.
    ExportKey,
    /// Ask the crypto collaborator to import the peer's key.
    ImportKey(PublicKeyRecord),
    /// Ask the crypto collaborator to encrypt an outgoing message.
    Encrypt(String),
    /// Ask the crypto collaborator to decrypt an incoming message.
    Decrypt(String),
    /// Append to the message log.
    AppendMessage {
        /// Whether this client wrote it.
        own: bool,
        /// Plaintext.
        content: String,
    },
    /// Scroll the message pane to the newest message.
    ScrollToBottom,
    /// Set the visible path.
    Navigate(String),
    /// Restart the handshake progress animation.
    ResetAnimation,
    /// Report a non-fatal condition.
    Log {
        /// Category.
        tag: &'static str,
        /// Detail.
        value: String,
    },
}

impl Effect {
    fn log(tag: &'static str, value: impl Into<String>) -> Self {
        Self::Log { tag, value: value.into() }
    }

    fn navigate_root() -> Self {
        Self::Navigate(ROOT_PATH.to_string())
    }
}

/// Handshake state machine.
///
/// Pure: no I/O, no clock. The current time is passed to [`Handshake::handle`]
/// for the inputs that record it.
#[derive(Debug, Clone)]
pub struct Handshake<I> {
    status: Status<I>,
}

impl<I: Timestamp> Default for Handshake<I> {
    fn default() -> Self {
        Self::new()
    }
}

impl<I: Timestamp> Handshake<I> {
    /// Create a handshake in [`Status::Start`].
    pub fn new() -> Self {
        Self { status: Status::Start }
    }

    /// Resume a handshake at `status`.
    pub fn from_status(status: Status<I>) -> Self {
        Self { status }
    }

    /// Current status.
    pub fn status(&self) -> &Status<I> {
        &self.status
    }

    /// Apply one input and return the effects to execute.
    pub fn handle(&mut self, input: HandshakeInput, now: I) -> Vec<Effect> {
        let status = std::mem::replace(&mut self.status, Status::Start);
        let (next, effects) = transition(status, input, now);
        self.status = next;
        effects
    }
}

fn transition<I: Timestamp>(
    status: Status<I>,
    input: HandshakeInput,
    now: I,
) -> (Status<I>, Vec<Effect>) {
    use HandshakeInput as In;
    use SocketMessage as Msg;

    match (status, input) {
        (Status::Start, In::CreateChat(chat_id)) => {
            (Status::Joining(Role::Creator { chat_id }), vec![Effect::ExportKey])
        },
        (Status::Start, In::JoinChat(chat_id)) => {
            (Status::Joining(Role::Joiner { chat_id, my_key: None }), vec![Effect::ExportKey])
        },

        // A waits for the relay to pair it; the relay assigns ids on connect.
        (Status::Joining(Role::Creator { chat_id }), In::KeyExported(my_key)) => {
            (Status::WaitingForAId { my_key, chat_id }, vec![])
        },
        (Status::Joining(Role::Joiner { chat_id, my_key: None }), In::KeyExported(key)) => {
            let join = ControlFrame::Join { chat_id: chat_id.clone() };
            let next = Status::Joining(Role::Joiner { chat_id, my_key: Some(key) });
            (next, vec![Effect::Send(join.into())])
        },
        (Status::Joining(_), In::KeyExportFailed(reason)) => (Status::Start, vec![
            Effect::ResetAnimation,
            Effect::navigate_root(),
            Effect::log(KEY_EXPORT_FAILED, reason),
        ]),

        (Status::Joining(Role::Joiner { my_key: Some(my_key), .. }), In::Relay(Msg::ReceiveAId(peer))) => {
            let frame = encode(peer.clone(), Payload::Key(my_key));
            (Status::WaitingForAKey { peer }, vec![Effect::Send(frame.into())])
        },
        // The relay names the chat it paired; that id is the one kept from here on.
        (Status::WaitingForAId { my_key, .. }, In::Relay(Msg::Waiting { peer, chat_id })) => {
            (Status::WaitingForBKey { my_key, peer, chat_id }, vec![])
        },
        (Status::WaitingForBKey { my_key, peer, .. }, In::Relay(Msg::Key(peer_key))) => {
            let frame = encode(peer.clone(), Payload::Key(my_key));
            (Status::Importing { peer }, vec![
                Effect::Send(frame.into()),
                Effect::ImportKey(peer_key),
            ])
        },
        (Status::WaitingForAKey { peer }, In::Relay(Msg::Key(peer_key))) => {
            (Status::Importing { peer }, vec![Effect::ImportKey(peer_key), Effect::ResetAnimation])
        },
        (Status::Importing { peer }, In::KeyImported) => {
            (Status::Ready { peer, typing: TypingStatus::NotTyping }, vec![Effect::navigate_root()])
        },
        (Status::Importing { .. }, In::KeyImportFailed(reason)) => (Status::Start, vec![
            Effect::ResetAnimation,
            Effect::navigate_root(),
            Effect::log(KEY_IMPORT_FAILED, reason),
        ]),

        (Status::Joining(_), In::Relay(Msg::RoomUnavailable)) => (Status::Start, vec![
            Effect::ResetAnimation,
            Effect::navigate_root(),
            Effect::log(ROOM_UNAVAILABLE, "relay rejected the join"),
        ]),

        (Status::Ready { peer, .. }, In::Relay(Msg::Typing)) => {
            (Status::Ready { peer, typing: TypingStatus::IsTyping { since: now } }, vec![])
        },
        // Decryption does not depend on the status; the completion does.
        (status, In::Relay(Msg::ReceiveMessage(ciphertext))) => {
            (status, vec![Effect::Decrypt(ciphertext)])
        },
        (Status::Ready { peer, .. }, In::Decrypted(content)) => {
            (Status::Ready { peer, typing: TypingStatus::NotTyping }, vec![
                Effect::AppendMessage { own: false, content },
                Effect::ScrollToBottom,
            ])
        },
        (status, In::DecryptFailed(reason)) => (status, vec![Effect::log(DECRYPT_FAILED, reason)]),

        (Status::Ready { peer, typing }, In::Submit(content)) => {
            (Status::Ready { peer, typing }, vec![
                Effect::Encrypt(content.clone()),
                Effect::AppendMessage { own: true, content },
                Effect::ScrollToBottom,
            ])
        },
        (Status::Ready { peer, typing }, In::Encrypted(ciphertext)) => {
            let frame = encode(peer.clone(), Payload::Message(ciphertext));
            (Status::Ready { peer, typing }, vec![Effect::Send(frame.into())])
        },
        (status, In::EncryptFailed(reason)) => (status, vec![Effect::log(ENCRYPT_FAILED, reason)]),

        (status, In::Relay(Msg::Error(message))) => {
            (status, vec![Effect::log(RELAY_ERROR, message)])
        },
        (status, In::ConnectionLost) => {
            let mut effects = Vec::new();
            if status.is_handshaking() {
                effects.push(Effect::ResetAnimation);
            }
            effects.push(Effect::log(CONNECTION_LOST, status.name()));
            (Status::Start, effects)
        },

        (status, input) => {
            let violation = ProtocolViolation::new(status.name(), input.tag());
            (status, vec![Effect::log(OOPS, violation.to_string())])
        },
    }
}

#[cfg(test)]
mod tests {
    use std::time::{Duration, Instant};

    use tandem_proto::ConnId;

    use super::*;

    fn key(tag: &str) -> PublicKeyRecord {
        PublicKeyRecord {
            alg: "RSA-OAEP-256".into(),
            e: "AQAB".into(),
            key_ops: vec!["encrypt".into()],
            n: tag.into(),
            kty: "RSA".into(),
            ext: None,
        }
    }

    fn sent_key(effects: &[Effect], to: &str) -> Option<PublicKeyRecord> {
        effects.iter().find_map(|e| match e {
            Effect::Send(Outbound::Peer(frame)) if frame.to.as_str() == to => match &frame.body {
                Payload::Key(k) => Some(k.clone()),
                _ => None,
            },
            _ => None,
        })
    }

    #[test]
    fn creator_path_reaches_ready() {
        let t0 = Instant::now();
        let mut hs = Handshake::new();

        let created = HandshakeInput::CreateChat(ChatId::new("c"));
        assert_eq!(hs.handle(created, t0), vec![Effect::ExportKey]);
        assert_eq!(hs.status(), &Status::Joining(Role::Creator { chat_id: ChatId::new("c") }));

        assert!(hs.handle(HandshakeInput::KeyExported(key("a")), t0).is_empty());
        assert_eq!(hs.status(), &Status::WaitingForAId { my_key: key("a"), chat_id: ChatId::new("c") });

        let waiting = SocketMessage::Waiting { peer: ConnId::new("b"), chat_id: ChatId::new("c") };
        assert!(hs.handle(HandshakeInput::Relay(waiting), t0).is_empty());
        assert!(matches!(hs.status(), Status::WaitingForBKey { peer, .. } if peer.as_str() == "b"));

        let effects = hs.handle(HandshakeInput::Relay(SocketMessage::Key(key("b"))), t0);
        assert_eq!(sent_key(&effects, "b"), Some(key("a")));
        assert!(effects.contains(&Effect::ImportKey(key("b"))));
        assert_eq!(hs.status(), &Status::Importing { peer: ConnId::new("b") });

        let effects = hs.handle(HandshakeInput::KeyImported, t0);
        assert_eq!(effects, vec![Effect::Navigate("/".into())]);
        assert_eq!(hs.status(), &Status::Ready {
            peer: ConnId::new("b"),
            typing: TypingStatus::NotTyping
        });
    }

    #[test]
    fn joiner_path_reaches_ready() {
        let t0 = Instant::now();
        let mut hs = Handshake::new();

        hs.handle(HandshakeInput::JoinChat(ChatId::new("c")), t0);
        let effects = hs.handle(HandshakeInput::KeyExported(key("b")), t0);
        assert_eq!(effects, vec![Effect::Send(Outbound::Control(ControlFrame::Join {
            chat_id: ChatId::new("c")
        }))]);
        assert!(matches!(hs.status(), Status::Joining(Role::Joiner { my_key: Some(_), .. })));

        let effects = hs.handle(HandshakeInput::Relay(SocketMessage::ReceiveAId(ConnId::new("a"))), t0);
        assert_eq!(sent_key(&effects, "a"), Some(key("b")));
        assert_eq!(hs.status(), &Status::WaitingForAKey { peer: ConnId::new("a") });

        let effects = hs.handle(HandshakeInput::Relay(SocketMessage::Key(key("a"))), t0);
        assert_eq!(effects, vec![Effect::ImportKey(key("a")), Effect::ResetAnimation]);

        hs.handle(HandshakeInput::KeyImported, t0);
        assert_eq!(hs.status().ready_peer(), Some(&ConnId::new("a")));
    }

    #[test]
    fn receive_a_id_before_key_export_is_oops() {
        let t0 = Instant::now();
        let mut hs = Handshake::new();
        hs.handle(HandshakeInput::JoinChat(ChatId::new("c")), t0);

        let effects = hs.handle(HandshakeInput::Relay(SocketMessage::ReceiveAId(ConnId::new("a"))), t0);
        assert!(matches!(effects.as_slice(), [Effect::Log { tag: OOPS, .. }]));
        assert!(matches!(hs.status(), Status::Joining(Role::Joiner { my_key: None, .. })));
    }

    #[test]
    fn room_unavailable_returns_to_start() {
        let t0 = Instant::now();
        let mut hs = Handshake::new();
        hs.handle(HandshakeInput::JoinChat(ChatId::new("gone")), t0);

        let effects = hs.handle(HandshakeInput::Relay(SocketMessage::RoomUnavailable), t0);
        assert_eq!(hs.status(), &Status::Start);
        assert!(effects.contains(&Effect::ResetAnimation));
        assert!(effects.contains(&Effect::Navigate("/".into())));
    }

    #[test]
    fn key_export_failure_abandons_handshake() {
        let t0 = Instant::now();
        let mut hs: Handshake<Instant> = Handshake::new();
        hs.handle(HandshakeInput::CreateChat(ChatId::new("c")), t0);

        let effects = hs.handle(HandshakeInput::KeyExportFailed("denied".into()), t0);
        assert_eq!(hs.status(), &Status::Start);
        assert_eq!(effects, vec![
            Effect::ResetAnimation,
            Effect::Navigate("/".into()),
            Effect::Log { tag: KEY_EXPORT_FAILED, value: "denied".into() },
        ]);
    }

    #[test]
    fn key_import_failure_abandons_handshake() {
        let t0 = Instant::now();
        let mut hs: Handshake<Instant> = Handshake::from_status(Status::Importing { peer: ConnId::new("a") });

        let effects = hs.handle(HandshakeInput::KeyImportFailed("bad key".into()), t0);
        assert_eq!(hs.status(), &Status::Start);
        assert_eq!(effects, vec![
            Effect::ResetAnimation,
            Effect::Navigate("/".into()),
            Effect::Log { tag: KEY_IMPORT_FAILED, value: "bad key".into() },
        ]);

        // The peer is not bound: a late import completion is rejected.
        let effects = hs.handle(HandshakeInput::KeyImported, t0);
        assert!(matches!(effects.as_slice(), [Effect::Log { tag: OOPS, .. }]));
        assert_eq!(hs.status().ready_peer(), None);
    }

    #[test]
    fn typing_then_message_clears_indicator() {
        let t0 = Instant::now();
        let t1 = t0 + Duration::from_millis(300);
        let mut hs: Handshake<Instant> =
            Handshake { status: Status::Ready { peer: ConnId::new("p"), typing: TypingStatus::NotTyping } };

        hs.handle(HandshakeInput::Relay(SocketMessage::Typing), t1);
        assert!(matches!(hs.status(), Status::Ready { typing: TypingStatus::IsTyping { since }, .. } if *since == t1));

        let effects = hs.handle(HandshakeInput::Relay(SocketMessage::ReceiveMessage("ct".into())), t1);
        assert_eq!(effects, vec![Effect::Decrypt("ct".into())]);
        assert!(hs.status().peer_is_typing(), "indicator holds until the plaintext lands");

        let effects = hs.handle(HandshakeInput::Decrypted("hello".into()), t1);
        assert_eq!(effects[0], Effect::AppendMessage { own: false, content: "hello".into() });
        assert!(!hs.status().peer_is_typing());
    }

    #[test]
    fn stale_import_after_reset_is_ignored() {
        let t0 = Instant::now();
        let mut hs: Handshake<Instant> = Handshake::new();
        hs.handle(HandshakeInput::JoinChat(ChatId::new("c")), t0);
        hs.handle(HandshakeInput::Relay(SocketMessage::RoomUnavailable), t0);

        let effects = hs.handle(HandshakeInput::KeyImported, t0);
        assert!(matches!(effects.as_slice(), [Effect::Log { tag: OOPS, .. }]));
        assert_eq!(hs.status(), &Status::Start);
    }

    #[test]
    fn connection_lost_from_ready_keeps_nothing() {
        let t0 = Instant::now();
        let mut hs: Handshake<Instant> =
            Handshake { status: Status::Ready { peer: ConnId::new("p"), typing: TypingStatus::NotTyping } };

        let effects = hs.handle(HandshakeInput::ConnectionLost, t0);
        assert_eq!(hs.status(), &Status::Start);
        assert!(matches!(effects.as_slice(), [Effect::Log { tag: CONNECTION_LOST, .. }]));
    }

    #[test]
    fn submit_encrypts_and_echoes_locally() {
        let t0 = Instant::now();
        let mut hs: Handshake<Instant> =
            Handshake { status: Status::Ready { peer: ConnId::new("p"), typing: TypingStatus::NotTyping } };

        let effects = hs.handle(HandshakeInput::Submit("hi".into()), t0);
        assert_eq!(effects[0], Effect::Encrypt("hi".into()));
        assert_eq!(effects[1], Effect::AppendMessage { own: true, content: "hi".into() });

        let effects = hs.handle(HandshakeInput::Encrypted("xx".into()), t0);
        assert_eq!(effects, vec![Effect::Send(Outbound::Peer(encode(
            ConnId::new("p"),
            Payload::Message("xx".into())
        )))]);
    }
}
