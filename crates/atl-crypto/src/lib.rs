//! # atl-crypto: Cryptographic Core for Address Translation
//!
//! Everything that turns secrets into keys and plaintext into envelopes:
//!
//! - **Key derivation** ([`kdf`]): PBKDF2-HMAC-SHA256 over a passphrase and
//!   a per-envelope random salt.
//! - **Envelope cipher** ([`envelope`]): AES-256-GCM with a 16-byte IV,
//!   serialized as `base64(IV || CIPHERTEXT || SALT || TAG)`.
//! - **Credential hashing** ([`credential`]): Argon2id PHC strings with an
//!   optional pepper. Verification is a plain `bool`.
//! - **Tenant scope** ([`scope`]): the single place where an access
//!   credential and tenant id become envelope key material.
//! - **Random tokens** ([`random`]): alphanumeric secrets from the OS RNG.
//!
//! All functions are free of shared mutable state. Every seal draws fresh
//! IV and salt bytes.

pub mod credential;
pub mod envelope;
pub mod error;
pub mod kdf;
pub mod random;
pub mod scope;

pub use credential::{CredentialHasher, HashParams};
pub use envelope::{open, open_parts, seal, seal_parts, SealedParts, IV_SIZE, SALT_SIZE, TAG_SIZE};
pub use error::CryptoError;
pub use kdf::{derive_key, KdfParams};
pub use random::random_token;
pub use scope::{open_address, seal_address, tenant_passphrase};
