#![deny(missing_docs)]

//! # atl-core: Foundational Types for Address Translation
//!
//! Domain primitives shared by every other crate in the workspace. Nothing
//! here performs I/O or encryption; the crate only knows how identifiers
//! are pseudonymized, which strings are acceptable tenant and credential
//! values, and how a per-identifier address record is shaped.
//!
//! ## Design Principles
//!
//! 1. **Newtypes at the boundary.** A raw request string becomes an
//!    [`Identifier`], [`TenantId`] or [`AccessCredential`] exactly once,
//!    and the constructor is where emptiness and length are checked.
//!
//! 2. **Identifiers are never stored.** Only the [`IdentifierDigest`] of an
//!    identifier is persisted or logged.
//!
//! 3. **Credentials do not print.** [`AccessCredential`] redacts itself in
//!    `Debug` and zeroes its buffer on drop.

pub mod digest;
pub mod error;
pub mod identity;
pub mod record;

pub use digest::{digest_hex, sha256_hex, DigestAlgorithm};
pub use error::ValidationError;
pub use identity::{AccessCredential, Identifier, IdentifierDigest, TenantId};
pub use record::AddressRecord;
