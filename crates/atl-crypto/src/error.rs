//! # Cryptographic Error Types
//!
//! Errors never carry plaintext, passphrases or key bytes.

use thiserror::Error;

/// Errors from key derivation, sealing, opening and hashing.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CryptoError {
    /// A cost or length parameter was out of range.
    #[error("invalid parameters: {0}")]
    InvalidParams(String),

    /// The envelope could not be decoded or is too short to hold its
    /// fixed segments.
    #[error("malformed envelope: {0}")]
    Malformed(String),

    /// The authentication tag did not verify. A wrong passphrase and a
    /// tampered envelope both end up here.
    #[error("envelope failed authentication")]
    Integrity,

    /// The envelope opened but the plaintext is not UTF-8.
    #[error("envelope plaintext is not valid UTF-8")]
    InvalidUtf8,

    /// The AEAD refused to encrypt (plaintext beyond GCM limits).
    #[error("encryption failed: {0}")]
    Encryption(String),

    /// Argon2 rejected the input or parameters while hashing.
    #[error("credential hashing failed: {0}")]
    Hash(String),
}
