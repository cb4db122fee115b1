//! Tenant credential persistence.
//!
//! All functions take a `&PgPool` and operate on `htl_translations.api_keys`.

use sqlx::PgPool;

/// Fetch the stored credential hash for a tenant.
pub async fn get_key(pool: &PgPool, name: &str) -> Result<Option<String>, sqlx::Error> {
    sqlx::query_scalar::<_, String>("SELECT key FROM htl_translations.api_keys WHERE name = $1")
        .bind(name)
        .fetch_optional(pool)
        .await
}

/// Insert or replace a tenant's credential hash.
pub async fn upsert_key(pool: &PgPool, name: &str, key: &str) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO htl_translations.api_keys (name, key)
         VALUES ($1, $2)
         ON CONFLICT (name) DO UPDATE SET key = EXCLUDED.key, updated_at = now()",
    )
    .bind(name)
    .bind(key)
    .execute(pool)
    .await?;

    Ok(())
}
