//! # atl-api: Address Translation HTTP Service
//!
//! Maps opaque customer identifiers to postal addresses, one sealed
//! envelope per tenant. Identifiers are stored only as SHA-256 digests;
//! addresses only as AES-256-GCM envelopes keyed by the caller's
//! credential and tenant.
//!
//! ## API Surface
//!
//! | Method   | Path                       | Handler                                     |
//! |----------|----------------------------|---------------------------------------------|
//! | `POST`   | `/translation`             | [`routes::translation::create_translation`] |
//! | `GET`    | `/translation`             | [`routes::translation::lookup_translation`] |
//! | `PUT`    | `/translation/identifier`  | [`routes::translation::rename_identifier`]  |
//! | `DELETE` | `/translation/identifier`  | [`routes::translation::delete_identifier`]  |
//! | `POST`   | `/translation/address`     | [`routes::translation::update_address`]     |
//! | `DELETE` | `/translation/address`     | [`routes::translation::delete_address`]     |
//!
//! Every translation route answers with `{result, status, message?}`.
//!
//! ## Middleware Stack (execution order)
//!
//! ```text
//! TraceLayer → tenant_gate → Handler
//! ```
//!
//! Health probes and `/openapi.json` skip the tenant gate.

pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod extractors;
pub mod middleware;
pub mod openapi;
pub mod routes;
pub mod state;
pub mod store;

use axum::extract::State;
use axum::http::StatusCode;
use axum::middleware::from_fn_with_state;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::Router;

use crate::state::AppState;

/// Assemble the full application router.
pub fn app(state: AppState) -> Router {
    // route_layer: unmatched paths fall through to 404 without touching the gate.
    let api = routes::translation::router()
        .route_layer(from_fn_with_state(state.clone(), auth::tenant_gate));

    let public = Router::new()
        .route("/health/liveness", get(liveness))
        .route("/health/readiness", get(readiness))
        .merge(openapi::router());

    Router::new()
        .merge(public)
        .merge(api)
        .layer(middleware::tracing_layer::layer())
        .with_state(state)
}

/// Liveness probe. Always 200 while the process runs.
async fn liveness() -> &'static str {
    "ok"
}

/// Readiness probe. 503 when the store cannot be reached.
async fn readiness(State(state): State<AppState>) -> Response {
    match state.store.ping().await {
        Ok(()) => (StatusCode::OK, "ready").into_response(),
        Err(e) => {
            tracing::warn!(error = %e, "readiness check failed");
            (StatusCode::SERVICE_UNAVAILABLE, "not ready").into_response()
        }
    }
}
