//! Fuzz target for session event sequences
//!
//! Drives one session with arbitrary interleavings of relay traffic, user
//! intents, crypto completions and clock ticks.
//!
//! # Invariants
//!
//! - NEVER panic
//! - The peer bound at `Ready` never changes until the session resets
//! - The message log never shrinks

#![no_main]

use std::time::{Duration, Instant};

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use tandem_app::{CryptoResult, Session, SessionEvent, SessionFlags, UserIntent};
use tandem_core::SessionConfig;
use tandem_proto::{ChatId, ConnId, PublicKeyRecord, ScrollEvent, SocketMessage};

#[derive(Debug, Arbitrary)]
enum Op {
    Tick { millis: u16 },
    Raw(String),
    Waiting { peer: u8, chat: u8 },
    ReceiveAId { peer: u8 },
    Ciphertext(String),
    Key,
    Typing,
    RelayError(String),
    RoomUnavailable,
    Closed,
    Create { chat: u8 },
    Join { chat: u8 },
    Input(String),
    Submit,
    Scroll { top: u16 },
    KeyExported { ok: bool },
    KeyImported { ok: bool },
    Encrypted { ok: bool, text: String },
    Decrypted { ok: bool, text: String },
}

fn key() -> PublicKeyRecord {
    PublicKeyRecord {
        alg: "RSA-OAEP-256".into(),
        e: "AQAB".into(),
        key_ops: vec!["encrypt".into()],
        n: "n".into(),
        kty: "RSA".into(),
        ext: None,
    }
}

fn relay(message: SocketMessage) -> SessionEvent<Instant> {
    SessionEvent::RelayText(message.to_json().unwrap_or_default())
}

fn result<T>(ok: bool, value: T) -> Result<T, String> {
    if ok { Ok(value) } else { Err("failed".into()) }
}

fuzz_target!(|ops: Vec<Op>| {
    let mut now = Instant::now();
    let mut session = Session::new(SessionFlags::default(), &SessionConfig::default(), now);
    let mut bound: Option<ConnId> = None;
    let mut logged = 0;

    for op in ops {
        let event = match op {
            Op::Tick { millis } => {
                now += Duration::from_millis(u64::from(millis));
                SessionEvent::Tick(now)
            }
            Op::Raw(text) => SessionEvent::RelayText(text),
            Op::Waiting { peer, chat } => relay(SocketMessage::Waiting {
                peer: ConnId::new(format!("p{}", peer % 3)),
                chat_id: ChatId::new(format!("c{}", chat % 3)),
            }),
            Op::ReceiveAId { peer } => {
                relay(SocketMessage::ReceiveAId(ConnId::new(format!("p{}", peer % 3))))
            }
            Op::Ciphertext(text) => relay(SocketMessage::ReceiveMessage(text)),
            Op::Key => relay(SocketMessage::Key(key())),
            Op::Typing => relay(SocketMessage::Typing),
            Op::RelayError(text) => relay(SocketMessage::Error(text)),
            Op::RoomUnavailable => relay(SocketMessage::RoomUnavailable),
            Op::Closed => SessionEvent::RelayClosed,
            Op::Create { chat } => UserIntent::CreateChat(ChatId::new(format!("c{}", chat % 3))).into(),
            Op::Join { chat } => UserIntent::JoinChat(ChatId::new(format!("c{}", chat % 3))).into(),
            Op::Input(text) => UserIntent::InputChanged(text).into(),
            Op::Submit => UserIntent::Submit.into(),
            Op::Scroll { top } => UserIntent::Scrolled(ScrollEvent {
                scroll_height: 70_000.0,
                scroll_top: f64::from(top),
                client_height: 600.0,
            })
            .into(),
            Op::KeyExported { ok } => CryptoResult::KeyExported(result(ok, key())).into(),
            Op::KeyImported { ok } => CryptoResult::KeyImported(result(ok, ())).into(),
            Op::Encrypted { ok, text } => CryptoResult::Encrypted(result(ok, text)).into(),
            Op::Decrypted { ok, text } => CryptoResult::Decrypted(result(ok, text)).into(),
        };

        session.handle(event);

        assert!(session.messages().len() >= logged);
        logged = session.messages().len();

        match (session.status().ready_peer(), &bound) {
            (Some(peer), Some(expected)) => assert_eq!(peer, expected),
            (Some(peer), None) => bound = Some(peer.clone()),
            (None, _) => bound = None,
        }
    }
});
