//! # Translation API
//!
//! Identifier to address lookups, scoped per tenant. Every route sits
//! behind [`crate::auth::tenant_gate`] and receives the verified tenant and
//! credential as [`AuthenticatedTenant`].
//!
//! | Method | Path | Success `status` |
//! |---|---|---|
//! | POST | `/translation` | `POSTED` |
//! | GET | `/translation` | the decrypted address |
//! | PUT | `/translation/identifier` | `POSTED` |
//! | DELETE | `/translation/identifier` | `DELETED` |
//! | POST | `/translation/address` | `UPDATED` |
//! | DELETE | `/translation/address` | `DELETED` |
//!
//! Identifiers are digested before they reach the store. Addresses are
//! sealed with the caller's tenant-scoped key on blocking threads.

use axum::body::Bytes;
use axum::extract::State;
use axum::http::Uri;
use axum::routing::{post, put};
use axum::{Json, Router};
use serde::Deserialize;
use utoipa::ToSchema;

use atl_core::{AddressRecord, Identifier, ValidationError};
use atl_crypto::{open_address, seal_address, CryptoError};

use crate::auth::AuthenticatedTenant;
use crate::error::{AppError, StatusBody};
use crate::extractors::{extract_validated, tenant_field, Validate};
use crate::state::AppState;
use crate::store::InsertOutcome;

// -- Request DTOs -------------------------------------------------------------

/// Body for `POST /translation` and `POST /translation/address`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct AddressRequest {
    /// Caller's identifier. Digested before storage.
    pub identifier: String,
    /// Plaintext address to seal.
    pub address: String,
    /// Calling tenant. Checked by the gate.
    #[serde(rename = "projectID", deserialize_with = "tenant_field")]
    pub project_id: String,
}

/// Body or query for `GET /translation`, `DELETE /translation/identifier`
/// and `DELETE /translation/address`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct IdentifierRequest {
    /// Caller's identifier.
    pub identifier: String,
    /// Calling tenant. Checked by the gate.
    #[serde(rename = "projectID", deserialize_with = "tenant_field")]
    pub project_id: String,
}

/// Body for `PUT /translation/identifier`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct RenameRequest {
    /// Current identifier.
    pub identifier: String,
    /// Replacement identifier.
    pub new_identifier: String,
    /// Calling tenant. Checked by the gate.
    #[serde(rename = "projectID", deserialize_with = "tenant_field")]
    pub project_id: String,
}

/// A validated identifier plus plaintext address.
#[derive(Debug)]
pub struct ValidAddress {
    identifier: Identifier,
    address: String,
}

impl Validate for AddressRequest {
    type Valid = ValidAddress;

    fn validate(self) -> Result<ValidAddress, ValidationError> {
        if self.address.is_empty() {
            return Err(ValidationError::Empty { field: "address" });
        }
        Ok(ValidAddress {
            identifier: Identifier::new(self.identifier)?,
            address: self.address,
        })
    }
}

impl Validate for IdentifierRequest {
    type Valid = Identifier;

    fn validate(self) -> Result<Identifier, ValidationError> {
        Identifier::new(self.identifier)
    }
}

impl Validate for RenameRequest {
    type Valid = (Identifier, Identifier);

    fn validate(self) -> Result<(Identifier, Identifier), ValidationError> {
        Ok((
            Identifier::new(self.identifier)?,
            Identifier::named("new_identifier", self.new_identifier)?,
        ))
    }
}

// -- Router -------------------------------------------------------------------

/// Build the translation router. The caller layers the tenant gate on top.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/translation", post(create_translation).get(lookup_translation))
        .route(
            "/translation/identifier",
            put(rename_identifier).delete(delete_identifier),
        )
        .route(
            "/translation/address",
            post(update_address).delete(delete_address),
        )
}

// -- Crypto on blocking threads ----------------------------------------------

async fn seal_for(
    state: &AppState,
    caller: &AuthenticatedTenant,
    address: String,
) -> Result<String, AppError> {
    let kdf = state.kdf();
    let caller = caller.clone();
    tokio::task::spawn_blocking(move || {
        seal_address(&address, &caller.credential, &caller.tenant, &kdf)
    })
    .await
    .map_err(|e| AppError::Internal(format!("seal task failed: {e}")))?
    .map_err(AppError::from)
}

async fn open_for(
    state: &AppState,
    caller: &AuthenticatedTenant,
    envelope: String,
) -> Result<Result<String, CryptoError>, AppError> {
    let kdf = state.kdf();
    let caller = caller.clone();
    tokio::task::spawn_blocking(move || {
        open_address(&envelope, &caller.credential, &caller.tenant, &kdf)
    })
    .await
    .map_err(|e| AppError::Internal(format!("open task failed: {e}")))
}

// -- Handlers -----------------------------------------------------------------

/// POST /translation: Store a new identifier with the caller's sealed address.
#[utoipa::path(
    post,
    path = "/translation",
    request_body = AddressRequest,
    responses(
        (status = 200, description = "POSTED, or result false with DUPLICATE", body = StatusBody),
        (status = 400, description = "Missing field", body = StatusBody),
        (status = 401, description = "INV_AUTH", body = StatusBody),
        (status = 500, description = "Storage failure", body = StatusBody),
    ),
    security(("access_key" = [])),
    tag = "translation"
)]
pub async fn create_translation(
    State(state): State<AppState>,
    caller: AuthenticatedTenant,
    uri: Uri,
    body: Bytes,
) -> Result<Json<StatusBody>, AppError> {
    let req = extract_validated::<AddressRequest>(&uri, &body)?;
    let digest = req.identifier.digest();
    let envelope = seal_for(&state, &caller, req.address).await?;

    let record = AddressRecord::new(digest.clone(), caller.tenant.clone(), envelope);
    match state.store.insert_record(&record).await? {
        InsertOutcome::Inserted => {
            tracing::info!(tenant = %caller.tenant, identifier_digest = %digest, "identifier added");
            Ok(Json(StatusBody::ok("POSTED", "Identifier added to database")))
        }
        InsertOutcome::Duplicate => Err(AppError::Duplicate),
    }
}

/// GET /translation: Open the caller's address for an identifier.
#[utoipa::path(
    get,
    path = "/translation",
    params(
        ("identifier" = Option<String>, Query, description = "Identifier, if not sent in the body"),
        ("projectID" = Option<String>, Query, description = "Tenant, if not sent in the body"),
    ),
    request_body = IdentifierRequest,
    responses(
        (status = 200, description = "Address in status, or result false with INVALID / INV_ID", body = StatusBody),
        (status = 400, description = "Missing field", body = StatusBody),
        (status = 401, description = "INV_AUTH", body = StatusBody),
        (status = 500, description = "Storage failure", body = StatusBody),
    ),
    security(("access_key" = [])),
    tag = "translation"
)]
pub async fn lookup_translation(
    State(state): State<AppState>,
    caller: AuthenticatedTenant,
    uri: Uri,
    body: Bytes,
) -> Result<Json<StatusBody>, AppError> {
    let identifier = extract_validated::<IdentifierRequest>(&uri, &body)?;
    let digest = identifier.digest();

    let record = state
        .store
        .fetch_record(&digest)
        .await?
        .ok_or(AppError::NotFound)?;

    let Some(envelope) = record.envelope_for(&caller.tenant) else {
        tracing::warn!(tenant = %caller.tenant, identifier_digest = %digest, "no entry for tenant");
        return Err(AppError::InvalidIdentifier);
    };

    match open_for(&state, &caller, envelope.to_string()).await? {
        Ok(address) => Ok(Json(StatusBody::value(address))),
        Err(e @ (CryptoError::Integrity | CryptoError::Malformed(_) | CryptoError::InvalidUtf8)) => {
            tracing::warn!(
                tenant = %caller.tenant,
                identifier_digest = %digest,
                reason = %e,
                "stored envelope did not open"
            );
            Err(AppError::InvalidIdentifier)
        }
        Err(e) => Err(e.into()),
    }
}

/// PUT /translation/identifier: Move a record to a new identifier.
///
/// The record moves with every tenant's entry. Renaming an identifier with
/// no record changes nothing and still answers `POSTED`.
#[utoipa::path(
    put,
    path = "/translation/identifier",
    request_body = RenameRequest,
    responses(
        (status = 200, description = "POSTED", body = StatusBody),
        (status = 400, description = "Missing field", body = StatusBody),
        (status = 401, description = "INV_AUTH", body = StatusBody),
        (status = 500, description = "Storage failure, including a taken new_identifier", body = StatusBody),
    ),
    security(("access_key" = [])),
    tag = "translation"
)]
pub async fn rename_identifier(
    State(state): State<AppState>,
    caller: AuthenticatedTenant,
    uri: Uri,
    body: Bytes,
) -> Result<Json<StatusBody>, AppError> {
    let (current, replacement) = extract_validated::<RenameRequest>(&uri, &body)?;
    let (from, to) = (current.digest(), replacement.digest());

    // A taken target surfaces as StoreError::Conflict, which is a 500.
    if state.store.rename_record(&from, &to).await? {
        tracing::info!(tenant = %caller.tenant, from = %from, to = %to, "identifier renamed");
    } else {
        tracing::info!(tenant = %caller.tenant, from = %from, "rename matched no record");
    }
    Ok(Json(StatusBody::ok("POSTED", "Identifier updated in database")))
}

/// DELETE /translation/identifier: Remove a record. Idempotent.
#[utoipa::path(
    delete,
    path = "/translation/identifier",
    request_body = IdentifierRequest,
    responses(
        (status = 200, description = "DELETED", body = StatusBody),
        (status = 400, description = "Missing field", body = StatusBody),
        (status = 401, description = "INV_AUTH", body = StatusBody),
        (status = 500, description = "Storage failure", body = StatusBody),
    ),
    security(("access_key" = [])),
    tag = "translation"
)]
pub async fn delete_identifier(
    State(state): State<AppState>,
    caller: AuthenticatedTenant,
    uri: Uri,
    body: Bytes,
) -> Result<Json<StatusBody>, AppError> {
    let identifier = extract_validated::<IdentifierRequest>(&uri, &body)?;
    let digest = identifier.digest();
    let existed = state.store.delete_record(&digest).await?;
    tracing::info!(tenant = %caller.tenant, identifier_digest = %digest, existed, "identifier deleted");
    Ok(Json(StatusBody::ok("DELETED", "Identifier deleted from database")))
}

/// POST /translation/address: Set the caller's address on an existing record.
///
/// Answers `UPDATED` even when no record matched.
#[utoipa::path(
    post,
    path = "/translation/address",
    request_body = AddressRequest,
    responses(
        (status = 200, description = "UPDATED", body = StatusBody),
        (status = 400, description = "Missing field", body = StatusBody),
        (status = 401, description = "INV_AUTH", body = StatusBody),
        (status = 500, description = "Storage failure", body = StatusBody),
    ),
    security(("access_key" = [])),
    tag = "translation"
)]
pub async fn update_address(
    State(state): State<AppState>,
    caller: AuthenticatedTenant,
    uri: Uri,
    body: Bytes,
) -> Result<Json<StatusBody>, AppError> {
    let req = extract_validated::<AddressRequest>(&uri, &body)?;
    let digest = req.identifier.digest();
    let envelope = seal_for(&state, &caller, req.address).await?;

    if state.store.put_address(&digest, &caller.tenant, &envelope).await? {
        tracing::info!(tenant = %caller.tenant, identifier_digest = %digest, "address updated");
    } else {
        tracing::info!(tenant = %caller.tenant, identifier_digest = %digest, "address update matched no record");
    }
    Ok(Json(StatusBody::ok("UPDATED", "Address updated in database")))
}

/// DELETE /translation/address: Remove the caller's address. Idempotent.
#[utoipa::path(
    delete,
    path = "/translation/address",
    request_body = IdentifierRequest,
    responses(
        (status = 200, description = "DELETED", body = StatusBody),
        (status = 400, description = "Missing field", body = StatusBody),
        (status = 401, description = "INV_AUTH", body = StatusBody),
        (status = 500, description = "Storage failure", body = StatusBody),
    ),
    security(("access_key" = [])),
    tag = "translation"
)]
pub async fn delete_address(
    State(state): State<AppState>,
    caller: AuthenticatedTenant,
    uri: Uri,
    body: Bytes,
) -> Result<Json<StatusBody>, AppError> {
    let identifier = extract_validated::<IdentifierRequest>(&uri, &body)?;
    let digest = identifier.digest();
    let removed = state.store.remove_address(&digest, &caller.tenant).await?;
    tracing::info!(tenant = %caller.tenant, identifier_digest = %digest, removed, "address deleted");
    Ok(Json(StatusBody::ok("DELETED", "Address deleted from database")))
}
