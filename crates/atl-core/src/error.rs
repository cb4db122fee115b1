//! # Validation Errors
//!
//! Raised when a request string cannot become a domain primitive.

use thiserror::Error;

/// A value failed construction-time validation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// A required value was empty.
    #[error("{field} must not be empty")]
    Empty {
        /// Name of the offending field as it appears on the wire.
        field: &'static str,
    },

    /// A value exceeded its maximum length.
    #[error("{field} exceeds {max} bytes (got {actual})")]
    TooLong {
        /// Name of the offending field as it appears on the wire.
        field: &'static str,
        /// Maximum permitted length in bytes.
        max: usize,
        /// Observed length in bytes.
        actual: usize,
    },

    /// A stored digest was not lowercase hex of the expected length.
    #[error("invalid identifier digest: \"{0}\" (expected 64 lowercase hex characters)")]
    InvalidDigest(String),

    /// An unknown digest algorithm name was supplied.
    #[error("unknown digest algorithm: \"{0}\"")]
    UnknownAlgorithm(String),
}
