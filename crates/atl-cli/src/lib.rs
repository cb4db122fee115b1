//! # atl-cli: Operator Tooling for the Address Translation Service
//!
//! Provides the `atl` command-line interface.
//!
//! ## Subcommands
//!
//! - `atl tenant provision` generates an access key for a tenant and
//!   stores (or prints) its Argon2 hash.
//! - `atl tenant hash` hashes an existing key.
//! - `atl envelope seal` / `atl envelope open` work on address envelopes.
//! - `atl digest` prints the stored form of an identifier.
//!
//! Hashing and database settings come from the same environment
//! variables the server reads:
//!
//! ```bash
//! ATL_CREDENTIAL_PEPPER=... DATABASE_URL=postgres://... atl tenant provision proj1 --register
//! atl envelope open --credential "$KEY" --project-id proj1 "$ENVELOPE"
//! ```

pub mod digest;
pub mod envelope;
pub mod tenant;
