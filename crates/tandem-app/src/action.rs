//! Session side effects.
//!
//! This module defines the [`SessionAction`] enum: instructions produced by
//! the [`crate::Session`] for the runtime to execute, in order.

use tandem_proto::{Outbound, PublicKeyRecord};

/// Actions produced by the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionAction {
    /// Render the model.
    Render,

    /// Write a frame to the relay.
    Send(Outbound),

    /// Export the own public key.
    ExportKey,

    /// Import the peer's public key.
    ImportKey(PublicKeyRecord),

    /// Encrypt an outgoing message.
    Encrypt(String),

    /// Decrypt an incoming message.
    Decrypt(String),

    /// Set the visible path.
    Navigate(String),

    /// Restart the handshake progress animation.
    ResetAnimation,

    /// Scroll the message pane to the newest message.
    ScrollToBottom,

    /// Report a non-fatal condition.
    Log {
        /// Category, e.g. `oops` or `decode_error`.
        tag: &'static str,
        /// Detail.
        value: String,
    },
}

impl SessionAction {
    /// Whether this action asks the crypto collaborator for work.
    pub fn is_crypto(&self) -> bool {
        matches!(self, Self::ExportKey | Self::ImportKey(_) | Self::Encrypt(_) | Self::Decrypt(_))
    }
}
