//! # Address Records
//!
//! One record per [`IdentifierDigest`], holding each tenant's sealed
//! address envelope. Entries are independent: writing or removing one
//! tenant's envelope never touches another's.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::identity::{IdentifierDigest, TenantId};

/// Per-identifier map from tenant to sealed address envelope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddressRecord {
    /// Storage key.
    pub digest: IdentifierDigest,
    /// Tenant to base64 envelope.
    pub addresses: BTreeMap<TenantId, String>,
    /// When the record was first inserted.
    pub created_at: DateTime<Utc>,
    /// When any entry last changed.
    pub updated_at: DateTime<Utc>,
}

impl AddressRecord {
    /// A record with a single tenant entry.
    pub fn new(digest: IdentifierDigest, tenant: TenantId, envelope: String) -> Self {
        let now = Utc::now();
        let mut addresses = BTreeMap::new();
        addresses.insert(tenant, envelope);
        Self {
            digest,
            addresses,
            created_at: now,
            updated_at: now,
        }
    }

    /// The envelope stored for `tenant`, if any.
    pub fn envelope_for(&self, tenant: &TenantId) -> Option<&str> {
        self.addresses.get(tenant).map(String::as_str)
    }

    /// Insert or overwrite `tenant`'s envelope.
    pub fn set_envelope(&mut self, tenant: TenantId, envelope: String) {
        self.addresses.insert(tenant, envelope);
        self.updated_at = Utc::now();
    }

    /// Remove `tenant`'s envelope. Returns whether one was present.
    pub fn remove_envelope(&mut self, tenant: &TenantId) -> bool {
        let removed = self.addresses.remove(tenant).is_some();
        if removed {
            self.updated_at = Utc::now();
        }
        removed
    }

    /// Move the record under a new key, keeping every tenant entry.
    pub fn rekey(&mut self, digest: IdentifierDigest) {
        self.digest = digest;
        self.updated_at = Utc::now();
    }
}
