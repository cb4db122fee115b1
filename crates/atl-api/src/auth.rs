//! # Tenant Authentication Gate
//!
//! Runs before every translation route.
//!
//! ```text
//! UNVERIFIED ──(projectID missing)──────────────▶ 400 ERR
//!     │
//!     ├──(credential lookup fails)──────────────▶ 500 ERR
//!     │
//!     ├──(verify(Authorization, stored) false)──▶ 401 INV_AUTH
//!     │
//!     └──(verify true)──────────────────────────▶ AUTHORIZED → handler
//! ```
//!
//! An unknown tenant is verified against "no hash", which the hasher
//! treats exactly like a wrong credential, so both produce the same 401
//! after comparable work.
//!
//! The `Authorization` header carries the raw access credential. It is
//! also the key material for the tenant's envelopes, so on success the
//! gate hands it to the handler inside [`AuthenticatedTenant`].
//!
//! `projectID` is read from the JSON body (or the query string when the
//! body is blank) and may be a string or a number. The gate buffers the body to do so and reattaches it
//! for the handler.

use std::sync::Arc;

use axum::body::Body;
use axum::extract::{FromRequestParts, Request, State};
use axum::http::request::Parts;
use axum::http::header;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use serde::Deserialize;

use atl_core::{AccessCredential, TenantId};

use crate::error::AppError;
use crate::extractors::{extract_fields, optional_tenant_field};
use crate::state::AppState;

/// A request that passed the gate.
///
/// Inserted into request extensions by [`tenant_gate`]; handlers take it
/// as an argument.
#[derive(Debug, Clone)]
pub struct AuthenticatedTenant {
    /// The verified tenant.
    pub tenant: TenantId,
    /// The credential that verified, for envelope key derivation.
    pub credential: AccessCredential,
}

impl<S> FromRequestParts<S> for AuthenticatedTenant
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthenticatedTenant>()
            .cloned()
            .ok_or(AppError::Unauthorized)
    }
}

#[derive(Deserialize)]
struct TenantField {
    #[serde(rename = "projectID", default, deserialize_with = "optional_tenant_field")]
    project_id: Option<String>,
}

/// Axum middleware enforcing tenant authentication.
pub async fn tenant_gate(State(state): State<AppState>, request: Request, next: Next) -> Response {
    match authorize(&state, request).await {
        Ok(request) => next.run(request).await,
        Err(err) => err.into_response(),
    }
}

async fn authorize(state: &AppState, request: Request) -> Result<Request, AppError> {
    let (mut parts, body) = request.into_parts();
    let limit = state.config.max_body_bytes;
    let bytes = axum::body::to_bytes(body, limit)
        .await
        .map_err(|_| AppError::BadRequest(format!("request body exceeds {limit} bytes")))?;

    let field: TenantField = extract_fields(&parts.uri, &bytes).inspect_err(|_| {
        tracing::warn!(reason = "missing_tenant", "request body unreadable at gate");
    })?;
    let tenant = match field.project_id {
        Some(raw) => TenantId::new(raw).inspect_err(|e| {
            tracing::warn!(reason = "missing_tenant", error = %e, "invalid projectID");
        })?,
        None => {
            tracing::warn!(reason = "missing_tenant", "projectID absent");
            return Err(AppError::BadRequest("projectID is required".to_string()));
        }
    };

    let presented = parts
        .headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|s| AccessCredential::new(s).ok());

    let stored = state.store.credential_hash(&tenant).await.map_err(|e| {
        tracing::warn!(tenant = %tenant, reason = "storage_error", "credential lookup failed");
        AppError::Internal(format!("credential lookup failed: {e}"))
    })?;

    let hasher = Arc::clone(&state.hasher);
    let secret = presented.clone();
    let verified = tokio::task::spawn_blocking(move || {
        let secret = secret.as_ref().map_or("", AccessCredential::expose_secret);
        hasher.verify(secret, stored.as_deref())
    })
    .await
    .map_err(|e| AppError::Internal(format!("verification task failed: {e}")))?;

    match (verified, presented) {
        (true, Some(credential)) => {
            tracing::debug!(tenant = %tenant, "tenant authenticated");
            parts
                .extensions
                .insert(AuthenticatedTenant { tenant, credential });
            Ok(Request::from_parts(parts, Body::from(bytes)))
        }
        _ => {
            tracing::warn!(tenant = %tenant, reason = "verification_failed", "tenant rejected");
            Err(AppError::Unauthorized)
        }
    }
}
