//! Crypto collaborator.
//!
//! Key generation, import, encryption and decryption live outside the
//! session. The [`KeyAgent`] trait is the seam: production wires it to the
//! host's crypto API, tests use a deterministic fake.

use std::future::Future;

use tandem_proto::PublicKeyRecord;

/// Asynchronous RSA key holder for one session.
///
/// The agent owns the session's private key and, after a successful
/// [`import_peer_key`](KeyAgent::import_peer_key), the peer's public key.
/// Clones share that state; the runtime hands a clone to every spawned
/// request.
///
/// # Invariants
///
/// - Private key material never leaves the agent.
/// - [`encrypt`](KeyAgent::encrypt) uses the most recently imported peer key.
pub trait KeyAgent: Clone + Send + Sync + 'static {
    /// Collaborator-specific error type.
    type Error: std::error::Error + Send + 'static;

    /// Export the own public key, generating the key pair on first use.
    fn export_public_key(
        &self,
    ) -> impl Future<Output = Result<PublicKeyRecord, Self::Error>> + Send;

    /// Import the peer's public key for later encryption.
    fn import_peer_key(
        &self,
        key: PublicKeyRecord,
    ) -> impl Future<Output = Result<(), Self::Error>> + Send;

    /// Encrypt `plaintext` for the peer. Returns the ciphertext as text.
    fn encrypt(&self, plaintext: String) -> impl Future<Output = Result<String, Self::Error>> + Send;

    /// Decrypt a ciphertext addressed to this client.
    fn decrypt(&self, ciphertext: String)
    -> impl Future<Output = Result<String, Self::Error>> + Send;
}
