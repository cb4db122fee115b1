//! # Credential Hashing
//!
//! Argon2id PHC strings for tenant access keys. The optional pepper is
//! Argon2's secret input and is never part of the stored string.
//!
//! [`CredentialHasher::verify`] returns `false` for every failure shape:
//! wrong secret, empty secret, missing hash, unparsable hash. The missing
//! and unparsable cases still run one full Argon2 evaluation against an
//! internal sentinel hash so they land in the same latency class as a
//! wrong secret.

use std::fmt;

use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::{Algorithm, Argon2, Params, Version};
use rand_core::OsRng;
use serde::{Deserialize, Serialize};
use zeroize::Zeroizing;

use crate::error::CryptoError;
use crate::random::random_token;

/// Argon2id cost parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HashParams {
    /// Memory cost in KiB.
    pub memory_kib: u32,
    /// Number of passes.
    pub iterations: u32,
    /// Degree of parallelism.
    pub parallelism: u32,
}

impl Default for HashParams {
    /// Argon2id with 19 MiB, 2 passes, 1 lane.
    fn default() -> Self {
        Self {
            memory_kib: Params::DEFAULT_M_COST,
            iterations: Params::DEFAULT_T_COST,
            parallelism: Params::DEFAULT_P_COST,
        }
    }
}

impl HashParams {
    fn to_argon2(self) -> Result<Params, CryptoError> {
        Params::new(self.memory_kib, self.iterations, self.parallelism, None)
            .map_err(|e| CryptoError::InvalidParams(e.to_string()))
    }
}

/// Hashes and verifies access credentials.
///
/// Cheap to clone. Safe to share across threads.
#[derive(Clone)]
pub struct CredentialHasher {
    params: HashParams,
    pepper: Option<Zeroizing<Vec<u8>>>,
    sentinel: String,
}

impl fmt::Debug for CredentialHasher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialHasher")
            .field("params", &self.params)
            .field("pepper", &self.pepper.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

impl CredentialHasher {
    /// Build a hasher. Computes one sentinel hash up front.
    ///
    /// # Errors
    ///
    /// [`CryptoError::InvalidParams`] if Argon2 rejects `params` or the
    /// pepper length.
    pub fn new(params: HashParams, pepper: Option<Vec<u8>>) -> Result<Self, CryptoError> {
        let mut hasher = Self {
            params,
            pepper: pepper.filter(|p| !p.is_empty()).map(Zeroizing::new),
            sentinel: String::new(),
        };
        let filler = random_token(32);
        hasher.sentinel = hasher.hash(&filler)?;
        Ok(hasher)
    }

    /// The cost parameters new hashes are produced with.
    pub fn params(&self) -> HashParams {
        self.params
    }

    fn argon2(&self) -> Result<Argon2<'_>, CryptoError> {
        let params = self.params.to_argon2()?;
        match &self.pepper {
            Some(pepper) => Argon2::new_with_secret(pepper, Algorithm::Argon2id, Version::V0x13, params)
                .map_err(|e| CryptoError::InvalidParams(e.to_string())),
            None => Ok(Argon2::new(Algorithm::Argon2id, Version::V0x13, params)),
        }
    }

    /// Hash `secret` into a self-describing PHC string.
    ///
    /// # Errors
    ///
    /// [`CryptoError::InvalidParams`] for an empty secret,
    /// [`CryptoError::Hash`] if Argon2 fails.
    pub fn hash(&self, secret: &str) -> Result<String, CryptoError> {
        if secret.is_empty() {
            return Err(CryptoError::InvalidParams("secret must not be empty".to_string()));
        }
        let salt = SaltString::generate(&mut OsRng);
        let hash = self
            .argon2()?
            .hash_password(secret.as_bytes(), &salt)
            .map_err(|e| CryptoError::Hash(e.to_string()))?;
        Ok(hash.to_string())
    }

    /// Check `secret` against `stored`.
    ///
    /// Never errors. Every failure, including an absent or unparsable
    /// `stored`, is `false`.
    pub fn verify(&self, secret: &str, stored: Option<&str>) -> bool {
        let parsed = stored
            .filter(|s| !s.is_empty())
            .and_then(|s| PasswordHash::new(s).ok());

        match parsed {
            Some(hash) if !secret.is_empty() => self.check(secret, &hash),
            _ => {
                tracing::debug!("credential hash absent or unparsable, verifying against sentinel");
                self.burn(secret);
                false
            }
        }
    }

    fn check(&self, secret: &str, hash: &PasswordHash<'_>) -> bool {
        match self.argon2() {
            Ok(argon2) => argon2.verify_password(secret.as_bytes(), hash).is_ok(),
            Err(e) => {
                tracing::error!(error = %e, "argon2 construction failed during verify");
                false
            }
        }
    }

    fn burn(&self, secret: &str) {
        let input = if secret.is_empty() { "-" } else { secret };
        if let Ok(hash) = PasswordHash::new(&self.sentinel) {
            let _ = self.check(input, &hash);
        }
    }
}
