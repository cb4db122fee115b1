//! # Database Persistence Layer
//!
//! Postgres persistence via SQLx. Two tables in schema `htl_translations`:
//!
//! - `api_keys(name, key)`: tenant id to Argon2id credential hash.
//! - `identifiers(identifier, address_data)`: identifier digest to a JSONB
//!   object of per-tenant envelopes.
//!
//! Migrations are embedded and applied by [`init_pool`].

pub mod api_keys;
pub mod identifiers;

use async_trait::async_trait;
use sqlx::postgres::{PgPool, PgPoolOptions};

use atl_core::{AddressRecord, IdentifierDigest, TenantId};

use crate::config::DatabaseConfig;
use crate::store::{InsertOutcome, StoreError, TranslationStore};

/// Connect and run embedded migrations.
pub async fn init_pool(config: &DatabaseConfig) -> Result<PgPool, sqlx::Error> {
    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .min_connections(1)
        .acquire_timeout(std::time::Duration::from_secs(5))
        .connect_with(config.connect_options()?)
        .await?;

    tracing::info!("Connected to PostgreSQL");

    sqlx::migrate!("./migrations").run(&pool).await?;
    tracing::info!("Database migrations applied");

    Ok(pool)
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::Database(db) if db.is_unique_violation() => Self::Conflict,
            _ => Self::Backend(err.to_string()),
        }
    }
}

/// [`TranslationStore`] backed by Postgres.
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    /// Wrap an existing pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// The underlying pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl TranslationStore for PgStore {
    async fn credential_hash(&self, tenant: &TenantId) -> Result<Option<String>, StoreError> {
        Ok(api_keys::get_key(&self.pool, tenant.as_str()).await?)
    }

    async fn register_tenant(
        &self,
        tenant: &TenantId,
        credential_hash: &str,
    ) -> Result<(), StoreError> {
        Ok(api_keys::upsert_key(&self.pool, tenant.as_str(), credential_hash).await?)
    }

    async fn insert_record(&self, record: &AddressRecord) -> Result<InsertOutcome, StoreError> {
        if identifiers::insert(&self.pool, record).await? {
            Ok(InsertOutcome::Inserted)
        } else {
            Ok(InsertOutcome::Duplicate)
        }
    }

    async fn fetch_record(
        &self,
        digest: &IdentifierDigest,
    ) -> Result<Option<AddressRecord>, StoreError> {
        identifiers::get(&self.pool, digest).await
    }

    async fn rename_record(
        &self,
        from: &IdentifierDigest,
        to: &IdentifierDigest,
    ) -> Result<bool, StoreError> {
        // A unique violation on the primary key surfaces as Conflict.
        Ok(identifiers::rename(&self.pool, from, to).await?)
    }

    async fn delete_record(&self, digest: &IdentifierDigest) -> Result<bool, StoreError> {
        Ok(identifiers::delete(&self.pool, digest).await?)
    }

    async fn put_address(
        &self,
        digest: &IdentifierDigest,
        tenant: &TenantId,
        envelope: &str,
    ) -> Result<bool, StoreError> {
        Ok(identifiers::set_address(&self.pool, digest, tenant, envelope).await?)
    }

    async fn remove_address(
        &self,
        digest: &IdentifierDigest,
        tenant: &TenantId,
    ) -> Result<bool, StoreError> {
        Ok(identifiers::remove_address(&self.pool, digest, tenant).await?)
    }

    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
