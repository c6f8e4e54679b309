//! Session input events.
//!
//! Everything the [`crate::Session`] reacts to arrives as a
//! [`SessionEvent`]: text from the relay, user intents from the host UI,
//! completions from the crypto collaborator and clock ticks.

use tandem_proto::{ChatId, PublicKeyRecord, ScrollEvent};

/// Events consumed by the session.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent<I> {
    /// Periodic tick carrying the current time.
    Tick(I),

    /// A text frame arrived from the relay.
    RelayText(String),

    /// The relay connection closed.
    RelayClosed,

    /// Something the user did.
    User(UserIntent),

    /// A crypto request finished.
    Crypto(CryptoResult),
}

/// User intents reported by the host UI.
#[derive(Debug, Clone, PartialEq)]
pub enum UserIntent {
    /// Start a new chat under a chat id the host minted.
    CreateChat(ChatId),

    /// Join an existing chat from an invite.
    JoinChat(ChatId),

    /// The composer text changed.
    InputChanged(String),

    /// Send the composer text.
    Submit,

    /// The message pane scrolled.
    Scrolled(ScrollEvent),

    /// The scroll-to-bottom arrow was clicked.
    ScrollToBottomClicked,

    /// The current notice was dismissed.
    DismissNotice,
}

/// Outcome of a crypto request.
///
/// Failures carry the collaborator's error rendered as text; the session only
/// logs them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CryptoResult {
    /// Own public key export.
    KeyExported(Result<PublicKeyRecord, String>),

    /// Peer public key import.
    KeyImported(Result<(), String>),

    /// Outgoing message encryption; `Ok` holds the ciphertext.
    Encrypted(Result<String, String>),

    /// Incoming message decryption; `Ok` holds the plaintext.
    Decrypted(Result<String, String>),
}

impl<I> From<UserIntent> for SessionEvent<I> {
    fn from(intent: UserIntent) -> Self {
        Self::User(intent)
    }
}

impl<I> From<CryptoResult> for SessionEvent<I> {
    fn from(result: CryptoResult) -> Self {
        Self::Crypto(result)
    }
}
