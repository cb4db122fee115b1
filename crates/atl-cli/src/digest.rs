//! # Digest Subcommand
//!
//! Prints the hex digest of an identifier, which is the key its record
//! is stored under. Useful for locating a row without the plaintext
//! identifier ever reaching the database.

use anyhow::Result;
use clap::Args;

use atl_core::{digest_hex, DigestAlgorithm};

/// Arguments for `atl digest`.
#[derive(Args, Debug)]
pub struct DigestArgs {
    /// Identifier to digest.
    pub identifier: String,

    /// Hash algorithm (sha256 or sha512).
    #[arg(long, short, default_value = "sha256")]
    pub algorithm: DigestAlgorithm,
}

/// Execute the digest subcommand.
pub fn run_digest(args: &DigestArgs) -> Result<u8> {
    println!("{}", digest_hex(&args.identifier, args.algorithm));
    Ok(0)
}
