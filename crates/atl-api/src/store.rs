//! # Translation Storage
//!
//! The [`TranslationStore`] trait is everything the gate and handlers need
//! from persistence. Implementations surface every failure as a
//! [`StoreError`]; nothing here retries.
//!
//! - [`crate::db::PgStore`]: Postgres, schema `htl_translations`.
//! - [`MemoryStore`]: process-local maps for development and tests.

use std::collections::HashMap;

use async_trait::async_trait;
use parking_lot::RwLock;
use thiserror::Error;

use atl_core::{AddressRecord, IdentifierDigest, TenantId};

/// Storage failure.
#[derive(Error, Debug)]
pub enum StoreError {
    /// A rename target already holds a record.
    #[error("identifier already exists")]
    Conflict,

    /// A stored row could not be turned back into domain types.
    #[error("corrupt row: {0}")]
    Corrupt(String),

    /// The backend failed (connection, query, timeout).
    #[error("storage backend error: {0}")]
    Backend(String),
}

/// Result of [`TranslationStore::insert_record`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertOutcome {
    /// The record was written.
    Inserted,
    /// A record with the same digest already existed and was left untouched.
    Duplicate,
}

/// Persistence for tenant credentials and address records.
#[async_trait]
pub trait TranslationStore: Send + Sync + 'static {
    /// The stored credential hash for `tenant`, if the tenant exists.
    async fn credential_hash(&self, tenant: &TenantId) -> Result<Option<String>, StoreError>;

    /// Create or replace `tenant`'s credential hash.
    async fn register_tenant(&self, tenant: &TenantId, credential_hash: &str)
        -> Result<(), StoreError>;

    /// Insert `record` unless its digest is already present.
    async fn insert_record(&self, record: &AddressRecord) -> Result<InsertOutcome, StoreError>;

    /// Load the record for `digest`.
    async fn fetch_record(
        &self,
        digest: &IdentifierDigest,
    ) -> Result<Option<AddressRecord>, StoreError>;

    /// Move the record at `from` to `to`, keeping every tenant entry.
    ///
    /// Returns `false` if there is no record at `from`, and
    /// [`StoreError::Conflict`] if `to` is taken by another record.
    async fn rename_record(
        &self,
        from: &IdentifierDigest,
        to: &IdentifierDigest,
    ) -> Result<bool, StoreError>;

    /// Delete the record at `digest`. Returns whether one existed.
    async fn delete_record(&self, digest: &IdentifierDigest) -> Result<bool, StoreError>;

    /// Set `tenant`'s envelope on an existing record. Returns `false` if
    /// there is no record at `digest`.
    async fn put_address(
        &self,
        digest: &IdentifierDigest,
        tenant: &TenantId,
        envelope: &str,
    ) -> Result<bool, StoreError>;

    /// Remove `tenant`'s envelope. Returns whether one was removed.
    async fn remove_address(
        &self,
        digest: &IdentifierDigest,
        tenant: &TenantId,
    ) -> Result<bool, StoreError>;

    /// Cheap liveness check against the backend.
    async fn ping(&self) -> Result<(), StoreError>;
}

// ── In-memory store ─────────────────────────────────────────────────────────

/// Process-local store. Contents do not survive a restart.
#[derive(Debug, Default)]
pub struct MemoryStore {
    credentials: RwLock<HashMap<TenantId, String>>,
    records: RwLock<HashMap<IdentifierDigest, AddressRecord>>,
}

impl MemoryStore {
    /// An empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of address records held.
    pub fn record_count(&self) -> usize {
        self.records.read().len()
    }
}

#[async_trait]
impl TranslationStore for MemoryStore {
    async fn credential_hash(&self, tenant: &TenantId) -> Result<Option<String>, StoreError> {
        Ok(self.credentials.read().get(tenant).cloned())
    }

    async fn register_tenant(
        &self,
        tenant: &TenantId,
        credential_hash: &str,
    ) -> Result<(), StoreError> {
        self.credentials
            .write()
            .insert(tenant.clone(), credential_hash.to_string());
        Ok(())
    }

    async fn insert_record(&self, record: &AddressRecord) -> Result<InsertOutcome, StoreError> {
        let mut records = self.records.write();
        if records.contains_key(&record.digest) {
            return Ok(InsertOutcome::Duplicate);
        }
        records.insert(record.digest.clone(), record.clone());
        Ok(InsertOutcome::Inserted)
    }

    async fn fetch_record(
        &self,
        digest: &IdentifierDigest,
    ) -> Result<Option<AddressRecord>, StoreError> {
        Ok(self.records.read().get(digest).cloned())
    }

    async fn rename_record(
        &self,
        from: &IdentifierDigest,
        to: &IdentifierDigest,
    ) -> Result<bool, StoreError> {
        let mut records = self.records.write();
        if !records.contains_key(from) {
            return Ok(false);
        }
        if from == to {
            return Ok(true);
        }
        if records.contains_key(to) {
            return Err(StoreError::Conflict);
        }
        match records.remove(from) {
            Some(mut record) => {
                record.rekey(to.clone());
                records.insert(to.clone(), record);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete_record(&self, digest: &IdentifierDigest) -> Result<bool, StoreError> {
        Ok(self.records.write().remove(digest).is_some())
    }

    async fn put_address(
        &self,
        digest: &IdentifierDigest,
        tenant: &TenantId,
        envelope: &str,
    ) -> Result<bool, StoreError> {
        match self.records.write().get_mut(digest) {
            Some(record) => {
                record.set_envelope(tenant.clone(), envelope.to_string());
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn remove_address(
        &self,
        digest: &IdentifierDigest,
        tenant: &TenantId,
    ) -> Result<bool, StoreError> {
        Ok(self
            .records
            .write()
            .get_mut(digest)
            .is_some_and(|record| record.remove_envelope(tenant)))
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}
