//! # Envelope Subcommand
//!
//! Seals and opens address envelopes outside the server, for migrations
//! and incident work. By default the key is scoped to a tenant exactly as
//! the server scopes it; `--passphrase` uses a raw passphrase instead.

use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use zeroize::Zeroizing;

use atl_core::{AccessCredential, TenantId};
use atl_crypto::{open, open_address, seal, seal_address, KdfParams, SealedParts};

/// Arguments for `atl envelope`.
#[derive(Args, Debug)]
pub struct EnvelopeArgs {
    #[command(subcommand)]
    pub command: EnvelopeCommand,
}

/// How the envelope key is derived.
#[derive(Args, Debug, Clone)]
pub struct KeySource {
    /// Tenant access key, as sent in the Authorization header.
    #[arg(long, requires = "project_id", conflicts_with = "passphrase")]
    pub credential: Option<String>,

    /// Tenant the envelope belongs to.
    #[arg(long = "project-id")]
    pub project_id: Option<String>,

    /// Raw passphrase, bypassing tenant scoping.
    #[arg(long)]
    pub passphrase: Option<String>,

    /// PBKDF2 iterations.
    #[arg(long, default_value_t = atl_crypto::kdf::DEFAULT_ITERATIONS)]
    pub iterations: u32,
}

/// Envelope subcommands.
#[derive(Subcommand, Debug)]
pub enum EnvelopeCommand {
    /// Seal a plaintext address.
    Seal {
        #[command(flatten)]
        key: KeySource,
        /// Print the IV, ciphertext, salt and tag as hex JSON.
        #[arg(long)]
        parts: bool,
        /// Address to seal.
        address: String,
    },

    /// Open an envelope and print the address.
    Open {
        #[command(flatten)]
        key: KeySource,
        /// Base64 envelope.
        envelope: String,
    },
}

/// Execute the envelope subcommand.
pub fn run_envelope(args: &EnvelopeArgs) -> Result<u8> {
    match &args.command {
        EnvelopeCommand::Seal {
            key,
            parts,
            address,
        } => {
            let envelope = seal_with(key, address)?;
            if *parts {
                let parts = SealedParts::from_envelope(&envelope)?;
                println!("{}", serde_json::to_string_pretty(&parts)?);
            } else {
                println!("{envelope}");
            }
            Ok(0)
        }
        EnvelopeCommand::Open { key, envelope } => {
            println!("{}", open_with(key, envelope)?);
            Ok(0)
        }
    }
}

enum Scope {
    Tenant(AccessCredential, TenantId),
    Raw(Zeroizing<String>),
}

impl KeySource {
    fn params(&self) -> KdfParams {
        KdfParams::with_iterations(self.iterations)
    }

    fn scope(&self) -> Result<Scope> {
        if let Some(passphrase) = &self.passphrase {
            return Ok(Scope::Raw(Zeroizing::new(passphrase.clone())));
        }
        let credential = self
            .credential
            .as_deref()
            .context("either --credential with --project-id, or --passphrase, is required")?;
        let tenant = self.project_id.as_deref().context("--project-id is required")?;
        Ok(Scope::Tenant(
            AccessCredential::new(credential)?,
            TenantId::new(tenant)?,
        ))
    }
}

/// Seal `address` under the key described by `key`.
pub fn seal_with(key: &KeySource, address: &str) -> Result<String> {
    let params = key.params();
    let envelope = match key.scope()? {
        Scope::Tenant(credential, tenant) => {
            tracing::debug!(tenant = %tenant, "sealing with tenant-scoped key");
            seal_address(address, &credential, &tenant, &params)?
        }
        Scope::Raw(passphrase) => seal(address, &passphrase, &params)?,
    };
    Ok(envelope)
}

/// Open `envelope` with the key described by `key`.
pub fn open_with(key: &KeySource, envelope: &str) -> Result<String> {
    let params = key.params();
    let address = match key.scope()? {
        Scope::Tenant(credential, tenant) => {
            tracing::debug!(tenant = %tenant, "opening with tenant-scoped key");
            open_address(envelope, &credential, &tenant, &params)
        }
        Scope::Raw(passphrase) => open(envelope, &passphrase, &params),
    }
    .context("envelope did not open")?;
    Ok(address)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tenant_key(iterations: u32) -> KeySource {
        KeySource {
            credential: Some("auth-token-42".into()),
            project_id: Some("proj1".into()),
            passphrase: None,
            iterations,
        }
    }

    #[test]
    fn opens_server_envelope() {
        let envelope =
            "AAECAwQFBgcICQoLDA0ODzlTnCs3qdus9s0FEBESExQVFhcYGRobHB0eH5kbpbNOFC2/n+W9MtXNUcQ=";
        assert_eq!(open_with(&tenant_key(1000), envelope).unwrap(), "123 Main St");
    }

    #[test]
    fn raw_passphrase_round_trip() {
        let key = KeySource {
            credential: None,
            project_id: None,
            passphrase: Some("auth-token-42".into()),
            iterations: 10,
        };
        let envelope = seal_with(&key, "9 Elm Rd").unwrap();
        assert_eq!(open_with(&key, &envelope).unwrap(), "9 Elm Rd");
        assert!(open_with(&tenant_key(10), &envelope).is_err());
    }

    #[test]
    fn missing_key_material_is_an_error() {
        let key = KeySource {
            credential: None,
            project_id: None,
            passphrase: None,
            iterations: 10,
        };
        assert!(seal_with(&key, "x").is_err());
    }
}
