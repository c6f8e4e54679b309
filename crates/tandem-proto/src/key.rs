//! Exported public key record.

use serde::{Deserialize, Serialize};

/// Asymmetric public key in exported JWK form.
///
/// The session layer only stores and forwards this value. Interpreting the
/// fields is the job of the crypto collaborator that produced it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicKeyRecord {
    /// Algorithm tag (e.g. `RSA-OAEP-256`).
    pub alg: String,
    /// Public exponent, base64url.
    pub e: String,
    /// Permitted key operations.
    pub key_ops: Vec<String>,
    /// Modulus, base64url.
    pub n: String,
    /// Key type (e.g. `RSA`).
    pub kty: String,
    /// Extractable flag. Preserved when the exporter sets it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ext: Option<bool>,
}
