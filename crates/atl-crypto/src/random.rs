//! # Random Tokens
//!
//! Alphanumeric secrets drawn from the OS RNG, for generated tenant access
//! keys and peppers.

use rand_core::{OsRng, RngCore};

const ALPHABET: &[u8; 62] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";

// Largest multiple of 62 that fits in a byte. Bytes at or above it are
// rejected to keep the distribution uniform.
const REJECT_AT: u8 = 248;

/// A uniformly random `[A-Za-z0-9]` string of `len` characters.
pub fn random_token(len: usize) -> String {
    let mut out = String::with_capacity(len);
    let mut buf = [0u8; 64];
    while out.len() < len {
        OsRng.fill_bytes(&mut buf);
        for &b in buf.iter() {
            if out.len() == len {
                break;
            }
            if b < REJECT_AT {
                out.push(ALPHABET[usize::from(b) % ALPHABET.len()] as char);
            }
        }
    }
    out
}
