//! Session orchestrator.
//!
//! This module defines the [`Session`]: the model the host renders from and
//! the single place that routes events into the core state machines.
//!
//! This is a pure state machine. It consumes [`SessionEvent`]s one at a time
//! and produces [`SessionAction`]s for the runtime to execute; crypto results
//! come back as events rather than being awaited.
//!
//! # Responsibilities
//!
//! - Decodes relay text and feeds it to the [`Handshake`].
//! - Owns the composer buffer and throttles typing pings.
//! - Debounces scroll measurements into the scroll-to-bottom flag.
//! - Keeps the message log and the user-facing notice.

use tandem_core::{
    Effect, Handshake, HandshakeInput, ScrollStatus, ScrollTracker, SessionConfig, Status,
    Timestamp, TypingThrottle,
};
use tandem_proto::{ChatId, Payload, encode};

use crate::{
    CryptoResult, Device, Message, Notice, SessionAction, SessionEvent, SessionFlags, UserIntent,
};

/// Log tag: relay text that is not a known message.
pub const DECODE_ERROR: &str = "decode_error";
/// Log tag: a frame was produced after the relay closed.
pub const SEND_DROPPED: &str = "send_dropped";

/// Client-side chat session.
#[derive(Debug, Clone)]
pub struct Session<I> {
    /// Key-exchange and messaging status machine.
    handshake: Handshake<I>,
    /// Initialization flags.
    flags: SessionFlags,
    /// Composer text.
    input: String,
    /// Message log, oldest first.
    messages: Vec<Message>,
    /// Latest session time.
    time: I,
    /// Time of the last composer change. `None` before the first keystroke.
    last_input: Option<I>,
    /// Outbound typing-ping throttle.
    throttle: TypingThrottle<I>,
    /// Scroll debouncer.
    scroll: ScrollTracker<I>,
    /// Whether the scroll-to-bottom arrow is shown.
    show_scroll_arrow: bool,
    /// Notice for the user. `None` if nothing to report.
    notice: Option<Notice>,
    /// Whether the relay connection is open.
    relay_connected: bool,
}

impl<I: Timestamp> Session<I> {
    /// Create a session in `Start` at time `now`.
    pub fn new(flags: SessionFlags, config: &SessionConfig, now: I) -> Self {
        Self {
            handshake: Handshake::new(),
            flags,
            input: String::new(),
            messages: Vec::new(),
            time: now,
            last_input: None,
            throttle: TypingThrottle::new(config.typing_interval),
            scroll: ScrollTracker::new(config.scroll_settle, config.near_bottom_margin),
            show_scroll_arrow: false,
            notice: None,
            relay_connected: true,
        }
    }

    /// Process an event and return actions.
    pub fn handle(&mut self, event: SessionEvent<I>) -> Vec<SessionAction> {
        match event {
            SessionEvent::Tick(now) => {
                self.time = now;
                vec![]
            },
            SessionEvent::RelayText(text) => match tandem_proto::decode(&text) {
                Ok(message) => {
                    let rejected_join = matches!(self.status(), Status::Joining(_))
                        && matches!(message, tandem_proto::SocketMessage::RoomUnavailable);
                    if rejected_join {
                        self.notice = Some(Notice::RoomUnavailable);
                    }
                    self.step(HandshakeInput::Relay(message))
                },
                Err(e) => {
                    vec![SessionAction::Log { tag: DECODE_ERROR, value: e.to_string() }]
                },
            },
            SessionEvent::RelayClosed => {
                self.relay_connected = false;
                self.notice = Some(Notice::ConnectionLost);
                self.step(HandshakeInput::ConnectionLost)
            },
            SessionEvent::User(intent) => self.handle_intent(intent),
            SessionEvent::Crypto(result) => self.step(match result {
                CryptoResult::KeyExported(Ok(key)) => HandshakeInput::KeyExported(key),
                CryptoResult::KeyExported(Err(e)) => HandshakeInput::KeyExportFailed(e),
                CryptoResult::KeyImported(Ok(())) => HandshakeInput::KeyImported,
                CryptoResult::KeyImported(Err(e)) => HandshakeInput::KeyImportFailed(e),
                CryptoResult::Encrypted(Ok(ciphertext)) => HandshakeInput::Encrypted(ciphertext),
                CryptoResult::Encrypted(Err(e)) => HandshakeInput::EncryptFailed(e),
                CryptoResult::Decrypted(Ok(plaintext)) => HandshakeInput::Decrypted(plaintext),
                CryptoResult::Decrypted(Err(e)) => HandshakeInput::DecryptFailed(e),
            }),
        }
    }

    fn handle_intent(&mut self, intent: UserIntent) -> Vec<SessionAction> {
        match intent {
            UserIntent::CreateChat(chat_id) => {
                self.notice = None;
                self.step(HandshakeInput::CreateChat(chat_id))
            },
            UserIntent::JoinChat(chat_id) => {
                self.notice = None;
                self.step(HandshakeInput::JoinChat(chat_id))
            },
            UserIntent::InputChanged(text) => self.input_changed(text),
            UserIntent::Submit => self.submit(),
            UserIntent::Scrolled(event) => {
                let show = self.scroll.observe(event, self.time);
                if show == self.show_scroll_arrow {
                    return vec![];
                }
                self.show_scroll_arrow = show;
                vec![SessionAction::Render]
            },
            UserIntent::ScrollToBottomClicked => vec![SessionAction::ScrollToBottom],
            UserIntent::DismissNotice => {
                self.notice = None;
                vec![SessionAction::Render]
            },
        }
    }

    fn input_changed(&mut self, text: String) -> Vec<SessionAction> {
        self.input = text;
        self.last_input = Some(self.time);

        let mut actions = Vec::new();
        let peer = self.handshake.status().ready_peer().cloned();
        if let Some(peer) = peer
            && self.throttle.try_ping(self.time)
        {
            let ping = encode(peer, Payload::Typing);
            actions.extend(self.apply(vec![Effect::Send(ping.into())]));
        }
        actions.push(SessionAction::Render);
        actions
    }

    fn submit(&mut self) -> Vec<SessionAction> {
        if self.input.trim().is_empty() {
            return vec![];
        }

        // Outside `Ready` the handshake rejects the submit and the draft stays.
        let ready = self.status().is_ready();
        let actions = self.step(HandshakeInput::Submit(self.input.clone()));
        if ready {
            self.input.clear();
        }
        actions
    }

    /// Feed the handshake and translate its effects.
    fn step(&mut self, input: HandshakeInput) -> Vec<SessionAction> {
        let effects = self.handshake.handle(input, self.time);
        let mut actions = self.apply(effects);
        actions.push(SessionAction::Render);
        actions
    }

    fn apply(&mut self, effects: Vec<Effect>) -> Vec<SessionAction> {
        let mut actions = Vec::with_capacity(effects.len());
        for effect in effects {
            let action = match effect {
                Effect::Send(frame) if !self.relay_connected => SessionAction::Log {
                    tag: SEND_DROPPED,
                    value: match frame.recipient() {
                        Some(peer) => format!("relay closed; dropping frame for {peer}"),
                        None => "relay closed; dropping control frame".to_string(),
                    },
                },
                Effect::Send(frame) => SessionAction::Send(frame),
                Effect::AppendMessage { own, content } => {
                    self.messages.push(Message { own, content });
                    continue;
                },
                Effect::ExportKey => SessionAction::ExportKey,
                Effect::ImportKey(key) => SessionAction::ImportKey(key),
                Effect::Encrypt(plaintext) => SessionAction::Encrypt(plaintext),
                Effect::Decrypt(ciphertext) => SessionAction::Decrypt(ciphertext),
                Effect::ScrollToBottom => SessionAction::ScrollToBottom,
                Effect::Navigate(path) => SessionAction::Navigate(path),
                Effect::ResetAnimation => SessionAction::ResetAnimation,
                Effect::Log { tag, value } => SessionAction::Log { tag, value },
            };
            actions.push(action);
        }
        actions
    }

    /// Handshake status.
    pub fn status(&self) -> &Status<I> {
        self.handshake.status()
    }

    /// Composer text.
    pub fn input(&self) -> &str {
        &self.input
    }

    /// Message log, oldest first.
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Latest session time.
    pub fn time(&self) -> I {
        self.time
    }

    /// Time of the last composer change.
    pub fn last_input(&self) -> Option<I> {
        self.last_input
    }

    /// Time the last typing ping was sent.
    pub fn last_typing_ping(&self) -> Option<I> {
        self.throttle.last_ping()
    }

    /// Scroll debouncer status.
    pub fn scroll_status(&self) -> ScrollStatus<I> {
        self.scroll.status()
    }

    /// Whether the scroll-to-bottom arrow is shown.
    pub fn show_scroll_arrow(&self) -> bool {
        self.show_scroll_arrow
    }

    /// Notice for the user, if any.
    pub fn notice(&self) -> Option<Notice> {
        self.notice
    }

    /// Whether the relay connection is open.
    pub fn is_relay_connected(&self) -> bool {
        self.relay_connected
    }

    /// Device class.
    pub fn device(&self) -> Device {
        self.flags.device
    }

    /// Initialization flags.
    pub fn flags(&self) -> &SessionFlags {
        &self.flags
    }

    /// Chat this session is about, if known.
    ///
    /// Comes from the handshake while it carries one, falling back to the
    /// invite the session was started with.
    pub fn chat_id(&self) -> Option<&ChatId> {
        self.status().chat_id().or(self.flags.chat_id.as_ref())
    }

    /// Link that lets the peer join this chat.
    ///
    /// `None` unless the host can share or copy and a chat id is known.
    pub fn invite_link(&self) -> Option<String> {
        if !(self.flags.share_enabled || self.flags.copy_enabled) {
            return None;
        }
        let chat_id = self.chat_id()?;
        Some(format!("{}/{}", self.flags.origin.trim_end_matches('/'), chat_id))
    }
}

#[cfg(test)]
mod tests {
    use std::time::{Duration, Instant};

    use tandem_proto::{ConnId, Outbound, ScrollEvent};

    use super::*;

    fn ready_session(now: Instant) -> Session<Instant> {
        let mut session = Session::new(SessionFlags::default(), &SessionConfig::default(), now);
        session.handshake = Handshake::from_status(Status::Ready {
            peer: ConnId::new("peer"),
            typing: tandem_core::TypingStatus::NotTyping,
        });
        session
    }

    fn typing_pings(actions: &[SessionAction]) -> usize {
        actions
            .iter()
            .filter(|a| {
                matches!(a, SessionAction::Send(Outbound::Peer(f)) if f.body == Payload::Typing)
            })
            .count()
    }

    #[test]
    fn tick_only_moves_time() {
        let t0 = Instant::now();
        let mut session = Session::new(SessionFlags::default(), &SessionConfig::default(), t0);
        let t1 = t0 + Duration::from_millis(25);

        assert!(session.handle(SessionEvent::Tick(t1)).is_empty());
        assert_eq!(session.time(), t1);
        assert_eq!(session.status(), &Status::Start);
    }

    #[test]
    fn malformed_relay_text_is_logged() {
        let mut session =
            Session::new(SessionFlags::default(), &SessionConfig::default(), Instant::now());

        let actions = session.handle(SessionEvent::RelayText("{nope".into()));
        assert!(matches!(actions.as_slice(), [SessionAction::Log { tag: DECODE_ERROR, .. }]));
        assert_eq!(session.status(), &Status::Start);
    }

    #[test]
    fn typing_outside_ready_sends_nothing() {
        let mut session =
            Session::new(SessionFlags::default(), &SessionConfig::default(), Instant::now());

        let actions = session.handle(UserIntent::InputChanged("h".into()).into());
        assert_eq!(typing_pings(&actions), 0);
        assert_eq!(session.input(), "h");
        assert_eq!(session.last_typing_ping(), None);
    }

    #[test]
    fn keystrokes_inside_window_ping_once() {
        let t0 = Instant::now();
        let mut session = ready_session(t0);

        let first = session.handle(UserIntent::InputChanged("h".into()).into());
        session.handle(SessionEvent::Tick(t0 + Duration::from_millis(1000)));
        let second = session.handle(UserIntent::InputChanged("he".into()).into());

        assert_eq!(typing_pings(&first), 1);
        assert_eq!(typing_pings(&second), 0);
        assert_eq!(session.last_typing_ping(), Some(t0));
        assert_eq!(session.last_input(), Some(t0 + Duration::from_millis(1000)));
    }

    #[test]
    fn blank_submit_is_ignored() {
        let mut session = ready_session(Instant::now());
        session.handle(UserIntent::InputChanged("   ".into()).into());

        assert!(session.handle(UserIntent::Submit.into()).is_empty());
        assert!(session.messages().is_empty());
    }

    #[test]
    fn submit_in_ready_appends_and_clears() {
        let mut session = ready_session(Instant::now());
        session.handle(UserIntent::InputChanged("hi".into()).into());

        let actions = session.handle(UserIntent::Submit.into());
        assert!(actions.contains(&SessionAction::Encrypt("hi".into())));
        assert!(actions.contains(&SessionAction::ScrollToBottom));
        assert_eq!(session.input(), "");
        assert_eq!(session.messages(), &[Message { own: true, content: "hi".into() }]);
    }

    #[test]
    fn submit_before_ready_keeps_draft() {
        let mut session =
            Session::new(SessionFlags::default(), &SessionConfig::default(), Instant::now());
        session.handle(UserIntent::InputChanged("early".into()).into());

        let actions = session.handle(UserIntent::Submit.into());
        assert!(actions.iter().any(|a| matches!(a, SessionAction::Log { tag: tandem_core::handshake::OOPS, .. })));
        assert_eq!(session.input(), "early");
        assert!(session.messages().is_empty());
    }

    #[test]
    fn scroll_arrow_renders_only_on_change() {
        let t0 = Instant::now();
        let mut session = ready_session(t0);
        let up = ScrollEvent { scroll_height: 2000.0, scroll_top: 0.0, client_height: 500.0 };

        assert_eq!(session.handle(UserIntent::Scrolled(up).into()), vec![SessionAction::Render]);
        assert!(session.show_scroll_arrow());
        assert!(session.handle(UserIntent::Scrolled(up).into()).is_empty());
    }

    #[test]
    fn relay_closed_drops_later_sends() {
        let t0 = Instant::now();
        let mut session = ready_session(t0);

        let actions = session.handle(SessionEvent::RelayClosed);
        assert!(actions.contains(&SessionAction::Log {
            tag: tandem_core::handshake::CONNECTION_LOST,
            value: "ready".into()
        }));
        assert_eq!(session.status(), &Status::Start);
        assert_eq!(session.notice(), Some(Notice::ConnectionLost));
        assert!(!session.is_relay_connected());

        session.handle(UserIntent::JoinChat(ChatId::new("c")).into());
        let key = tandem_proto::PublicKeyRecord {
            alg: "RSA-OAEP-256".into(),
            e: "AQAB".into(),
            key_ops: vec!["encrypt".into()],
            n: "b".into(),
            kty: "RSA".into(),
            ext: None,
        };
        let actions = session.handle(CryptoResult::KeyExported(Ok(key)).into());
        assert!(!actions.iter().any(|a| matches!(a, SessionAction::Send(_))));
        assert!(actions.iter().any(|a| matches!(a, SessionAction::Log { tag: SEND_DROPPED, .. })));
    }

    #[test]
    fn invite_link_needs_share_or_copy() {
        let flags = SessionFlags {
            chat_id: Some(ChatId::new("room-7")),
            origin: "https://chat.example/".into(),
            ..SessionFlags::default()
        };
        let session = Session::new(flags.clone(), &SessionConfig::default(), Instant::now());
        assert_eq!(session.invite_link(), None);

        let flags = SessionFlags { copy_enabled: true, ..flags };
        let session = Session::new(flags, &SessionConfig::default(), Instant::now());
        assert_eq!(session.invite_link().as_deref(), Some("https://chat.example/room-7"));
    }

    #[test]
    fn creator_gets_invite_link_while_waiting() {
        let flags = SessionFlags {
            origin: "https://chat.example".into(),
            share_enabled: true,
            ..SessionFlags::default()
        };
        let mut session = Session::new(flags, &SessionConfig::default(), Instant::now());
        assert_eq!(session.invite_link(), None);

        session.handle(UserIntent::CreateChat(ChatId::new("fresh")).into());
        let key = tandem_proto::PublicKeyRecord {
            alg: "RSA-OAEP-256".into(),
            e: "AQAB".into(),
            key_ops: vec!["encrypt".into()],
            n: "a".into(),
            kty: "RSA".into(),
            ext: None,
        };
        session.handle(CryptoResult::KeyExported(Ok(key)).into());

        assert_eq!(session.status().name(), "waiting_for_a_id");
        assert_eq!(session.invite_link().as_deref(), Some("https://chat.example/fresh"));
    }

    #[test]
    fn crypto_requests_are_flagged() {
        assert!(SessionAction::ExportKey.is_crypto());
        assert!(SessionAction::Decrypt("x".into()).is_crypto());
        assert!(!SessionAction::Render.is_crypto());
    }
}
