//! Address record persistence.
//!
//! All functions take a `&PgPool` and operate on
//! `htl_translations.identifiers`. `address_data` is a JSONB object from
//! projectID to base64 envelope.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use sqlx::types::Json;
use sqlx::PgPool;

use atl_core::{AddressRecord, IdentifierDigest, TenantId};

use crate::store::StoreError;

/// Insert a record unless the identifier exists. Returns whether a row was written.
pub async fn insert(pool: &PgPool, record: &AddressRecord) -> Result<bool, sqlx::Error> {
    let data: BTreeMap<&str, &str> = record
        .addresses
        .iter()
        .map(|(tenant, envelope)| (tenant.as_str(), envelope.as_str()))
        .collect();

    let result = sqlx::query(
        "INSERT INTO htl_translations.identifiers (identifier, address_data, created_at, updated_at)
         VALUES ($1, $2, $3, $4)
         ON CONFLICT (identifier) DO NOTHING",
    )
    .bind(record.digest.as_str())
    .bind(Json(data))
    .bind(record.created_at)
    .bind(record.updated_at)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}

/// Fetch a record by identifier digest.
///
/// A row that no longer parses into domain types is [`StoreError::Corrupt`].
pub async fn get(
    pool: &PgPool,
    digest: &IdentifierDigest,
) -> Result<Option<AddressRecord>, StoreError> {
    let row = sqlx::query_as::<_, IdentifierRow>(
        "SELECT identifier, address_data, created_at, updated_at
         FROM htl_translations.identifiers WHERE identifier = $1",
    )
    .bind(digest.as_str())
    .fetch_optional(pool)
    .await?;

    row.map(IdentifierRow::into_record).transpose()
}

/// Re-key a record. Returns whether a row matched `from`.
pub async fn rename(
    pool: &PgPool,
    from: &IdentifierDigest,
    to: &IdentifierDigest,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        "UPDATE htl_translations.identifiers
         SET identifier = $1, updated_at = now()
         WHERE identifier = $2",
    )
    .bind(to.as_str())
    .bind(from.as_str())
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}

/// Delete a record. Returns whether a row was removed.
pub async fn delete(pool: &PgPool, digest: &IdentifierDigest) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM htl_translations.identifiers WHERE identifier = $1")
        .bind(digest.as_str())
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}

/// Set one tenant's envelope. Returns whether the record exists.
pub async fn set_address(
    pool: &PgPool,
    digest: &IdentifierDigest,
    tenant: &TenantId,
    envelope: &str,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        "UPDATE htl_translations.identifiers
         SET address_data = jsonb_set(address_data, ARRAY[$1::text], to_jsonb($2::text)),
             updated_at = now()
         WHERE identifier = $3",
    )
    .bind(tenant.as_str())
    .bind(envelope)
    .bind(digest.as_str())
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}

/// Remove one tenant's envelope. Returns whether an entry was removed.
pub async fn remove_address(
    pool: &PgPool,
    digest: &IdentifierDigest,
    tenant: &TenantId,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        "UPDATE htl_translations.identifiers
         SET address_data = address_data - $1::text, updated_at = now()
         WHERE identifier = $2 AND address_data ? $1::text",
    )
    .bind(tenant.as_str())
    .bind(digest.as_str())
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}

// -- Row types ----------------------------------------------------------------

#[derive(sqlx::FromRow)]
struct IdentifierRow {
    identifier: String,
    address_data: Json<BTreeMap<String, String>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl IdentifierRow {
    fn into_record(self) -> Result<AddressRecord, StoreError> {
        let digest = IdentifierDigest::from_hex(self.identifier)
            .map_err(|e| StoreError::Corrupt(e.to_string()))?;
        let addresses = self
            .address_data
            .0
            .into_iter()
            .map(|(tenant, envelope)| {
                TenantId::new(tenant)
                    .map(|t| (t, envelope))
                    .map_err(|e| StoreError::Corrupt(format!("address_data key: {e}")))
            })
            .collect::<Result<BTreeMap<_, _>, _>>()?;

        Ok(AddressRecord {
            digest,
            addresses,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}
