//! Codec error types.

use thiserror::Error;

/// Result alias for codec operations.
pub type Result<T> = std::result::Result<T, CodecError>;

/// Errors produced while encoding or decoding relay frames.
#[derive(Error, Debug)]
pub enum CodecError {
    /// Text is not valid JSON or does not match any known frame shape.
    #[error("malformed frame: {0}")]
    Malformed(#[source] serde_json::Error),

    /// A bare string payload other than the typing marker.
    #[error("unknown payload marker: {0:?}")]
    UnknownMarker(String),

    /// Serialization failed.
    #[error("failed to encode frame: {0}")]
    Encode(#[source] serde_json::Error),
}

impl CodecError {
    /// Returns true if this error came from reading inbound text.
    pub fn is_decode(&self) -> bool {
        matches!(self, Self::Malformed(_) | Self::UnknownMarker(_))
    }
}
