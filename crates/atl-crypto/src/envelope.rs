//! # Address Envelopes
//!
//! AES-256-GCM under a PBKDF2-derived key, with a 16-byte IV (GCM's GHASH
//! nonce path) so envelopes interoperate with existing stored data.
//!
//! ## Wire Format
//!
//! ```text
//! base64( IV[16] || CIPHERTEXT[n] || SALT[16] || TAG[16] )
//! ```
//!
//! Segment boundaries come from the fixed sizes and the total length only.
//! There are no delimiters, so an envelope of `48 + n` bytes always carries
//! an `n`-byte ciphertext.

use aes_gcm::aead::consts::U16;
use aes_gcm::aead::{AeadInPlace, KeyInit};
use aes_gcm::aes::Aes256;
use aes_gcm::{AesGcm, Nonce, Tag};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use rand_core::{OsRng, RngCore};
use serde::{Deserialize, Serialize};

use crate::error::CryptoError;
use crate::kdf::{derive_key, KdfParams};

/// IV length in bytes.
pub const IV_SIZE: usize = 16;
/// Salt length in bytes.
pub const SALT_SIZE: usize = 16;
/// GCM tag length in bytes.
pub const TAG_SIZE: usize = 16;

const AES_256_KEY_SIZE: usize = 32;

type Aes256Gcm16 = AesGcm<Aes256, U16>;

/// The four segments of an envelope, kept apart.
///
/// Serializes as lower-case hex under the keys `IV`, `CIPHERTEXT`, `SALT`,
/// `TAG` for callers that persist the structured form. The single-string form
/// from [`SealedParts::to_envelope`] is authoritative.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "HexParts", into = "HexParts")]
pub struct SealedParts {
    /// GCM nonce.
    pub iv: [u8; IV_SIZE],
    /// Encrypted plaintext, same length as the plaintext.
    pub ciphertext: Vec<u8>,
    /// PBKDF2 salt.
    pub salt: [u8; SALT_SIZE],
    /// GCM authentication tag.
    pub tag: [u8; TAG_SIZE],
}

impl SealedParts {
    /// Minimum raw envelope length (empty plaintext).
    pub const MIN_LEN: usize = IV_SIZE + SALT_SIZE + TAG_SIZE;

    /// Concatenate into raw envelope bytes.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(Self::MIN_LEN + self.ciphertext.len());
        out.extend_from_slice(&self.iv);
        out.extend_from_slice(&self.ciphertext);
        out.extend_from_slice(&self.salt);
        out.extend_from_slice(&self.tag);
        out
    }

    /// Split raw envelope bytes at the fixed boundaries.
    ///
    /// # Errors
    ///
    /// [`CryptoError::Malformed`] if `raw` is shorter than [`Self::MIN_LEN`].
    pub fn from_bytes(raw: &[u8]) -> Result<Self, CryptoError> {
        if raw.len() < Self::MIN_LEN {
            return Err(CryptoError::Malformed(format!(
                "expected at least {} bytes, got {}",
                Self::MIN_LEN,
                raw.len()
            )));
        }
        let (iv, rest) = raw.split_at(IV_SIZE);
        let (rest, tag) = rest.split_at(rest.len() - TAG_SIZE);
        let (ciphertext, salt) = rest.split_at(rest.len() - SALT_SIZE);

        Ok(Self {
            iv: to_array(iv)?,
            ciphertext: ciphertext.to_vec(),
            salt: to_array(salt)?,
            tag: to_array(tag)?,
        })
    }

    /// Encode as the authoritative base64 envelope string.
    pub fn to_envelope(&self) -> String {
        STANDARD.encode(self.to_bytes())
    }

    /// Decode a base64 envelope string.
    ///
    /// # Errors
    ///
    /// [`CryptoError::Malformed`] on invalid base64 or a truncated envelope.
    pub fn from_envelope(envelope: &str) -> Result<Self, CryptoError> {
        let raw = STANDARD
            .decode(envelope.trim())
            .map_err(|e| CryptoError::Malformed(format!("base64: {e}")))?;
        Self::from_bytes(&raw)
    }
}

fn to_array<const N: usize>(slice: &[u8]) -> Result<[u8; N], CryptoError> {
    slice
        .try_into()
        .map_err(|_| CryptoError::Malformed(format!("segment must be {N} bytes")))
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
struct HexParts {
    iv: String,
    ciphertext: String,
    salt: String,
    tag: String,
}

impl From<SealedParts> for HexParts {
    fn from(p: SealedParts) -> Self {
        Self {
            iv: hex::encode(p.iv),
            ciphertext: hex::encode(&p.ciphertext),
            salt: hex::encode(p.salt),
            tag: hex::encode(p.tag),
        }
    }
}

impl TryFrom<HexParts> for SealedParts {
    type Error = CryptoError;

    fn try_from(h: HexParts) -> Result<Self, Self::Error> {
        let decode = |field: &str, value: &str| {
            hex::decode(value).map_err(|e| CryptoError::Malformed(format!("{field}: {e}")))
        };
        Ok(Self {
            iv: to_array(&decode("IV", &h.iv)?)?,
            ciphertext: decode("CIPHERTEXT", &h.ciphertext)?,
            salt: to_array(&decode("SALT", &h.salt)?)?,
            tag: to_array(&decode("TAG", &h.tag)?)?,
        })
    }
}

fn cipher_for(
    passphrase: &[u8],
    salt: &[u8; SALT_SIZE],
    params: &KdfParams,
) -> Result<Aes256Gcm16, CryptoError> {
    if params.key_length != AES_256_KEY_SIZE {
        return Err(CryptoError::InvalidParams(format!(
            "AES-256 requires a {AES_256_KEY_SIZE}-byte key, got key_length {}",
            params.key_length
        )));
    }
    let key = derive_key(passphrase, salt, params)?;
    Aes256Gcm16::new_from_slice(key.as_slice())
        .map_err(|_| CryptoError::InvalidParams("derived key has wrong length".to_string()))
}

fn seal_with(
    plaintext: &[u8],
    passphrase: &[u8],
    iv: [u8; IV_SIZE],
    salt: [u8; SALT_SIZE],
    params: &KdfParams,
) -> Result<SealedParts, CryptoError> {
    let cipher = cipher_for(passphrase, &salt, params)?;
    let mut buffer = plaintext.to_vec();
    let tag = cipher
        .encrypt_in_place_detached(Nonce::<U16>::from_slice(&iv), b"", &mut buffer)
        .map_err(|e| CryptoError::Encryption(e.to_string()))?;

    Ok(SealedParts {
        iv,
        ciphertext: buffer,
        salt,
        tag: to_array(tag.as_slice())?,
    })
}

/// Seal `plaintext` with a fresh random IV and salt, returning the parts.
///
/// # Errors
///
/// [`CryptoError::InvalidParams`] if `params.key_length` is not 32 or
/// fails validation.
pub fn seal_parts(
    plaintext: &[u8],
    passphrase: &[u8],
    params: &KdfParams,
) -> Result<SealedParts, CryptoError> {
    let mut iv = [0u8; IV_SIZE];
    let mut salt = [0u8; SALT_SIZE];
    OsRng.fill_bytes(&mut iv);
    OsRng.fill_bytes(&mut salt);
    seal_with(plaintext, passphrase, iv, salt, params)
}

/// Decrypt and authenticate a structured envelope.
///
/// # Errors
///
/// [`CryptoError::Integrity`] if the tag does not verify.
pub fn open_parts(
    parts: &SealedParts,
    passphrase: &[u8],
    params: &KdfParams,
) -> Result<Vec<u8>, CryptoError> {
    let cipher = cipher_for(passphrase, &parts.salt, params)?;
    let mut buffer = parts.ciphertext.clone();
    cipher
        .decrypt_in_place_detached(
            Nonce::<U16>::from_slice(&parts.iv),
            b"",
            &mut buffer,
            Tag::<U16>::from_slice(&parts.tag),
        )
        .map_err(|_| CryptoError::Integrity)?;
    Ok(buffer)
}

/// Seal a string into a base64 envelope.
pub fn seal(plaintext: &str, passphrase: &str, params: &KdfParams) -> Result<String, CryptoError> {
    Ok(seal_parts(plaintext.as_bytes(), passphrase.as_bytes(), params)?.to_envelope())
}

/// Open a base64 envelope back into its string.
///
/// # Errors
///
/// - [`CryptoError::Malformed`] for bad base64 or truncation.
/// - [`CryptoError::Integrity`] for a wrong passphrase or tampering.
/// - [`CryptoError::InvalidUtf8`] if the authenticated plaintext is not UTF-8.
pub fn open(envelope: &str, passphrase: &str, params: &KdfParams) -> Result<String, CryptoError> {
    let parts = SealedParts::from_envelope(envelope)?;
    let plaintext = open_parts(&parts, passphrase.as_bytes(), params)?;
    String::from_utf8(plaintext).map_err(|_| CryptoError::InvalidUtf8)
}
