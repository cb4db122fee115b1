//! # Identity Newtypes
//!
//! Request-facing primitives. Each type validates at construction, so a
//! handler holding a [`TenantId`] never has to re-check for emptiness.
//!
//! | Type | Wire field | Persisted as |
//! |---|---|---|
//! | [`Identifier`] | `identifier`, `new_identifier` | never (digest only) |
//! | [`IdentifierDigest`] | n/a | primary key |
//! | [`TenantId`] | `projectID` | map key, credential row name |
//! | [`AccessCredential`] | `Authorization` header | never |

use std::fmt;

use serde::{Deserialize, Serialize};
use zeroize::Zeroizing;

use crate::digest::sha256_hex;
use crate::error::ValidationError;

/// Upper bound on identifier length in bytes.
pub const MAX_IDENTIFIER_LEN: usize = 1024;
/// Upper bound on tenant id length in bytes.
pub const MAX_TENANT_LEN: usize = 128;
/// Upper bound on access credential length in bytes.
pub const MAX_CREDENTIAL_LEN: usize = 1024;

fn check(field: &'static str, value: &str, max: usize) -> Result<(), ValidationError> {
    if value.is_empty() {
        return Err(ValidationError::Empty { field });
    }
    if value.len() > max {
        return Err(ValidationError::TooLong {
            field,
            max,
            actual: value.len(),
        });
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Identifier
// ---------------------------------------------------------------------------

/// A caller-supplied opaque record name.
///
/// Deliberately has no `Serialize` impl: the plaintext identifier is
/// digested immediately and must not be written anywhere.
#[derive(Clone, PartialEq, Eq)]
pub struct Identifier(String);

impl Identifier {
    /// Validate and wrap an identifier.
    ///
    /// # Errors
    ///
    /// [`ValidationError::Empty`] or [`ValidationError::TooLong`].
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        Self::named("identifier", value)
    }

    /// Like [`Identifier::new`] but reports errors against `field`.
    pub fn named(field: &'static str, value: impl Into<String>) -> Result<Self, ValidationError> {
        let s = value.into();
        check(field, &s, MAX_IDENTIFIER_LEN)?;
        Ok(Self(s))
    }

    /// Compute the storage key for this identifier.
    pub fn digest(&self) -> IdentifierDigest {
        IdentifierDigest(sha256_hex(&self.0))
    }

    /// Access the raw identifier.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Print the digest; the raw identifier stays out of logs.
        write!(f, "Identifier({})", self.digest())
    }
}

// ---------------------------------------------------------------------------
// IdentifierDigest
// ---------------------------------------------------------------------------

/// Lowercase hex SHA-256 of an [`Identifier`]. The storage primary key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct IdentifierDigest(String);

impl IdentifierDigest {
    /// Hex length of a SHA-256 digest.
    pub const HEX_LEN: usize = 64;

    /// Parse a digest read back from storage.
    ///
    /// # Errors
    ///
    /// [`ValidationError::InvalidDigest`] unless the input is exactly 64
    /// lowercase hex characters.
    pub fn from_hex(value: impl Into<String>) -> Result<Self, ValidationError> {
        let s = value.into();
        let ok = s.len() == Self::HEX_LEN
            && s.bytes().all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b));
        if !ok {
            return Err(ValidationError::InvalidDigest(s));
        }
        Ok(Self(s))
    }

    /// Access the hex string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for IdentifierDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for IdentifierDigest {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_hex(value)
    }
}

impl From<IdentifierDigest> for String {
    fn from(value: IdentifierDigest) -> Self {
        value.0
    }
}

// ---------------------------------------------------------------------------
// TenantId
// ---------------------------------------------------------------------------

/// The calling tenant (`projectID` on the wire).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TenantId(String);

impl TenantId {
    /// Validate and wrap a tenant id.
    ///
    /// # Errors
    ///
    /// [`ValidationError::Empty`] or [`ValidationError::TooLong`].
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let s = value.into();
        check("projectID", &s, MAX_TENANT_LEN)?;
        Ok(Self(s))
    }

    /// Access the tenant id string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TenantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for TenantId {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<TenantId> for String {
    fn from(value: TenantId) -> Self {
        value.0
    }
}

// ---------------------------------------------------------------------------
// AccessCredential
// ---------------------------------------------------------------------------

/// The raw secret a tenant presents in the `Authorization` header.
///
/// Verified against the stored credential hash and reused as key material
/// for the tenant's address envelopes. Zeroed on drop.
#[derive(Clone)]
pub struct AccessCredential(Zeroizing<String>);

impl AccessCredential {
    /// Validate and wrap a credential.
    ///
    /// # Errors
    ///
    /// [`ValidationError::Empty`] or [`ValidationError::TooLong`]. The
    /// error never contains the credential itself.
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let s = Zeroizing::new(value.into());
        check("Authorization", &s, MAX_CREDENTIAL_LEN)?;
        Ok(Self(s))
    }

    /// Borrow the secret. Callers must not log the result.
    pub fn expose_secret(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for AccessCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AccessCredential([REDACTED])")
    }
}
