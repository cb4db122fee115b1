//! # OpenAPI Specification Assembly
//!
//! Collects the utoipa-documented translation routes into one document,
//! served at `/openapi.json` without authentication.

use axum::routing::get;
use axum::{Json, Router};
use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::state::AppState;

/// OpenAPI document for the translation API.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Address Translation API",
        version = "0.1.0",
        description = "Per-tenant encrypted identifier to address lookups.",
        license(name = "AGPL-3.0-or-later")
    ),
    paths(
        crate::routes::translation::create_translation,
        crate::routes::translation::lookup_translation,
        crate::routes::translation::rename_identifier,
        crate::routes::translation::delete_identifier,
        crate::routes::translation::update_address,
        crate::routes::translation::delete_address,
    ),
    components(schemas(
        crate::error::StatusBody,
        crate::routes::translation::AddressRequest,
        crate::routes::translation::IdentifierRequest,
        crate::routes::translation::RenameRequest,
    )),
    modifiers(&AccessKeyScheme),
    tags(
        (name = "translation", description = "Identifier to address translation"),
    )
)]
pub struct ApiDoc;

/// Registers the raw `Authorization` header as the `access_key` scheme.
struct AccessKeyScheme;

impl Modify for AccessKeyScheme {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "access_key",
            SecurityScheme::ApiKey(ApiKey::Header(ApiKeyValue::new("Authorization"))),
        );
    }
}

/// Router serving `/openapi.json`.
pub fn router() -> Router<AppState> {
    Router::new().route("/openapi.json", get(openapi_json))
}

async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}
