//! # Key Derivation
//!
//! PBKDF2-HMAC-SHA256. The salt is random per envelope and travels inside
//! it, so two envelopes sealed under the same passphrase never share a key.

use pbkdf2::pbkdf2_hmac;
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use zeroize::Zeroizing;

use crate::error::CryptoError;

/// Default PBKDF2 iteration count.
pub const DEFAULT_ITERATIONS: u32 = 60_000;

/// Default derived key length in bytes (AES-256).
pub const DEFAULT_KEY_LENGTH: usize = 32;

/// Cost and output size for [`derive_key`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct KdfParams {
    /// PBKDF2 rounds. Defaults to [`DEFAULT_ITERATIONS`].
    pub iterations: u32,
    /// Output length in bytes. Defaults to [`DEFAULT_KEY_LENGTH`].
    pub key_length: usize,
}

impl Default for KdfParams {
    fn default() -> Self {
        Self {
            iterations: DEFAULT_ITERATIONS,
            key_length: DEFAULT_KEY_LENGTH,
        }
    }
}

impl KdfParams {
    /// Default key length with a custom iteration count.
    pub fn with_iterations(iterations: u32) -> Self {
        Self {
            iterations,
            ..Self::default()
        }
    }

    /// Reject zero iterations and zero-length output.
    pub fn validate(&self) -> Result<(), CryptoError> {
        if self.iterations == 0 {
            return Err(CryptoError::InvalidParams(
                "iterations must be at least 1".to_string(),
            ));
        }
        if self.key_length == 0 {
            return Err(CryptoError::InvalidParams(
                "key_length must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// Derive `params.key_length` bytes from `passphrase` and `salt`.
///
/// Deterministic for identical inputs.
///
/// # Errors
///
/// [`CryptoError::InvalidParams`] if `params` fails [`KdfParams::validate`].
pub fn derive_key(
    passphrase: &[u8],
    salt: &[u8],
    params: &KdfParams,
) -> Result<Zeroizing<Vec<u8>>, CryptoError> {
    params.validate()?;
    let mut key = Zeroizing::new(vec![0u8; params.key_length]);
    pbkdf2_hmac::<Sha256>(passphrase, salt, params.iterations, key.as_mut_slice());
    Ok(key)
}
