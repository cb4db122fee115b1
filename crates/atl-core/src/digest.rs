//! # Digests
//!
//! Deterministic one-way hashing of arbitrary strings into lowercase hex.
//! Used to pseudonymize identifiers before they reach storage and to build
//! tenant-scoped key material in `atl-crypto`.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256, Sha512};

use crate::error::ValidationError;

/// Hash algorithm selector for [`digest_hex`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DigestAlgorithm {
    /// SHA-256, 64 hex characters. Used for identifier digests.
    #[default]
    Sha256,
    /// SHA-512, 128 hex characters.
    Sha512,
}

impl DigestAlgorithm {
    /// Canonical lowercase name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sha256 => "sha256",
            Self::Sha512 => "sha512",
        }
    }

    /// Length of the hex output in characters.
    pub fn hex_len(&self) -> usize {
        match self {
            Self::Sha256 => 64,
            Self::Sha512 => 128,
        }
    }
}

impl fmt::Display for DigestAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DigestAlgorithm {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "sha256" | "sha-256" => Ok(Self::Sha256),
            "sha512" | "sha-512" => Ok(Self::Sha512),
            _ => Err(ValidationError::UnknownAlgorithm(s.to_string())),
        }
    }
}

/// Hash `input` with `algorithm` and return the lowercase hex digest.
pub fn digest_hex(input: &str, algorithm: DigestAlgorithm) -> String {
    match algorithm {
        DigestAlgorithm::Sha256 => hex::encode(Sha256::digest(input.as_bytes())),
        DigestAlgorithm::Sha512 => hex::encode(Sha512::digest(input.as_bytes())),
    }
}

/// SHA-256 hex digest of `input`.
pub fn sha256_hex(input: &str) -> String {
    digest_hex(input, DigestAlgorithm::Sha256)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sha256_empty_string_known_vector() {
        assert_eq!(
            sha256_hex(""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn sha256_identifier_vector() {
        assert_eq!(
            sha256_hex("customer-8812"),
            "48a802a40cdad6182df6891f3ce8bfc914de2ad7ba168842bc5bc8ac28a84e81"
        );
    }

    #[test]
    fn sha512_identifier_vector() {
        assert_eq!(
            digest_hex("customer-8812", DigestAlgorithm::Sha512),
            "5fb7ca4706474df621400d23b16c632fc8e123e1f7e9a611e67288a708738ecc\
             0d3fc3fe23f78d37a8c4469c35a711f7f24c3bc2454e5ddc1c7aa89c076f9ef6"
        );
    }

    #[test]
    fn output_length_matches_algorithm() {
        for alg in [DigestAlgorithm::Sha256, DigestAlgorithm::Sha512] {
            assert_eq!(digest_hex("x", alg).len(), alg.hex_len());
        }
    }

    #[test]
    fn algorithm_parses_common_spellings() {
        assert_eq!("sha256".parse::<DigestAlgorithm>().unwrap(), DigestAlgorithm::Sha256);
        assert_eq!("SHA-512".parse::<DigestAlgorithm>().unwrap(), DigestAlgorithm::Sha512);
        assert!("md5".parse::<DigestAlgorithm>().is_err());
    }

    #[test]
    fn algorithm_display_round_trips() {
        for alg in [DigestAlgorithm::Sha256, DigestAlgorithm::Sha512] {
            assert_eq!(alg.to_string().parse::<DigestAlgorithm>().unwrap(), alg);
        }
    }

    #[test]
    fn serde_uses_lowercase_names() {
        let json = serde_json::to_string(&DigestAlgorithm::Sha512).unwrap();
        assert_eq!(json, "\"sha512\"");
    }
}
