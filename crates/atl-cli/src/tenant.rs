//! # Tenant Subcommand
//!
//! Issues tenant access keys. The plaintext key is shown once; only its
//! Argon2id hash is kept. Hash cost and pepper come from the same
//! environment the server reads, so hashes produced here verify there.

use std::io::BufRead;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::{Args, Subcommand};
use zeroize::Zeroizing;

use atl_api::config::AppConfig;
use atl_api::db::{init_pool, PgStore};
use atl_api::store::TranslationStore;
use atl_core::TenantId;
use atl_crypto::{random_token, CredentialHasher};

/// Shortest key `provision` will issue.
pub const MIN_KEY_LENGTH: usize = 16;

/// Arguments for `atl tenant`.
#[derive(Args, Debug)]
pub struct TenantArgs {
    #[command(subcommand)]
    pub command: TenantCommand,
}

/// Tenant subcommands.
#[derive(Subcommand, Debug)]
pub enum TenantCommand {
    /// Generate a new access key for a tenant.
    Provision {
        /// Tenant identifier (the `projectID` clients send).
        project_id: String,
        /// Generated key length in characters.
        #[arg(long, default_value_t = 32)]
        key_length: usize,
        /// Write the hash to the configured database instead of printing SQL.
        #[arg(long)]
        register: bool,
    },

    /// Hash an existing access key. Reads stdin when `--credential` is absent.
    Hash {
        /// Key to hash.
        #[arg(long)]
        credential: Option<String>,
    },
}

/// Execute the tenant subcommand.
pub fn run_tenant(args: &TenantArgs) -> Result<u8> {
    let config = AppConfig::from_env().context("invalid environment configuration")?;
    match &args.command {
        TenantCommand::Provision {
            project_id,
            key_length,
            register,
        } => cmd_provision(&config, project_id, *key_length, *register),
        TenantCommand::Hash { credential } => {
            let secret = match credential {
                Some(c) => Zeroizing::new(c.clone()),
                None => read_stdin_line()?,
            };
            println!("{}", hasher_for(&config)?.hash(&secret)?);
            Ok(0)
        }
    }
}

fn cmd_provision(config: &AppConfig, project_id: &str, key_length: usize, register: bool) -> Result<u8> {
    let issued = issue_key(config, project_id, key_length)?;

    if register {
        let Some(database) = &config.database else {
            bail!("--register needs DATABASE_URL or POSTGRES_HOST");
        };
        let runtime = tokio::runtime::Runtime::new().context("failed to start async runtime")?;
        runtime.block_on(async {
            let pool = init_pool(database).await.context("database initialization failed")?;
            let store: Arc<dyn TranslationStore> = Arc::new(PgStore::new(pool));
            store
                .register_tenant(&issued.tenant, &issued.hash)
                .await
                .context("failed to store credential hash")
        })?;
        tracing::info!(tenant = %issued.tenant, "tenant registered");
        println!("OK: registered tenant {}", issued.tenant);
    } else {
        println!("{}", insert_statement(&issued.tenant, &issued.hash));
    }
    println!("  Access key (shown once): {}", issued.key.as_str());
    Ok(0)
}

/// A freshly issued key and its hash.
#[derive(Debug)]
pub struct IssuedKey {
    /// Tenant the key belongs to.
    pub tenant: TenantId,
    /// Plaintext key for the tenant.
    pub key: Zeroizing<String>,
    /// Argon2id PHC string to store.
    pub hash: String,
}

/// Generate and hash a key for `project_id`.
pub fn issue_key(config: &AppConfig, project_id: &str, key_length: usize) -> Result<IssuedKey> {
    if key_length < MIN_KEY_LENGTH {
        bail!("key length must be at least {MIN_KEY_LENGTH}");
    }
    let tenant = TenantId::new(project_id)?;
    let key = Zeroizing::new(random_token(key_length));
    let hash = hasher_for(config)?.hash(&key)?;
    Ok(IssuedKey { tenant, key, hash })
}

/// SQL that stores `hash` for `tenant`.
pub fn insert_statement(tenant: &TenantId, hash: &str) -> String {
    format!(
        "INSERT INTO htl_translations.api_keys (name, key) VALUES ('{}', '{}') \
         ON CONFLICT (name) DO UPDATE SET key = EXCLUDED.key, updated_at = now();",
        tenant.as_str().replace('\'', "''"),
        hash.replace('\'', "''"),
    )
}

fn hasher_for(config: &AppConfig) -> Result<CredentialHasher> {
    let pepper = config.pepper.as_ref().map(|p| p.to_vec());
    Ok(CredentialHasher::new(config.hash, pepper)?)
}

fn read_stdin_line() -> Result<Zeroizing<String>> {
    let mut line = Zeroizing::new(String::new());
    std::io::stdin()
        .lock()
        .read_line(&mut line)
        .context("failed to read credential from stdin")?;
    let trimmed = Zeroizing::new(line.trim_end_matches(['\r', '\n']).to_string());
    if trimmed.is_empty() {
        bail!("no credential on stdin");
    }
    Ok(trimmed)
}
