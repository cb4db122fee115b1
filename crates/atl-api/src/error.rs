//! # API Error Types
//!
//! Every response, success or failure, is a [`StatusBody`]:
//!
//! ```json
//! { "result": false, "status": "INV_AUTH", "message": "Unauthorized" }
//! ```
//!
//! | Variant | HTTP | `status` |
//! |---|---|---|
//! | [`AppError::BadRequest`] | 400 | `ERR` |
//! | [`AppError::Unauthorized`] | 401 | `INV_AUTH` |
//! | [`AppError::Duplicate`] | 200 | `DUPLICATE` |
//! | [`AppError::NotFound`] | 200 | `INVALID` |
//! | [`AppError::InvalidIdentifier`] | 200 | `INV_ID` |
//! | [`AppError::Internal`] | 500 | `ERR` |
//!
//! Internal detail is logged and replaced by a fixed message.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

use crate::store::StoreError;

/// Uniform response envelope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct StatusBody {
    /// Whether the operation succeeded.
    pub result: bool,
    /// Machine-readable outcome, or the decrypted address on a successful lookup.
    pub status: String,
    /// Human-readable detail.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl StatusBody {
    /// A successful outcome with a message.
    pub fn ok(status: &str, message: &str) -> Self {
        Self {
            result: true,
            status: status.to_string(),
            message: Some(message.to_string()),
        }
    }

    /// A successful lookup carrying the address as its status.
    pub fn value(value: String) -> Self {
        Self {
            result: true,
            status: value,
            message: None,
        }
    }
}

/// Application-level error type that implements [`IntoResponse`].
#[derive(Error, Debug)]
pub enum AppError {
    /// A required field is missing or invalid (400).
    #[error("bad request: {0}")]
    BadRequest(String),

    /// Unknown tenant, wrong credential, or no credential (401).
    #[error("unauthorized")]
    Unauthorized,

    /// The target identifier already exists (200, `result: false`).
    #[error("identifier already exists")]
    Duplicate,

    /// No record for the identifier (200, `result: false`).
    #[error("identifier not found")]
    NotFound,

    /// A record exists but holds nothing this tenant can open (200, `result: false`).
    #[error("invalid identifier")]
    InvalidIdentifier,

    /// Storage or primitive failure (500). Message is logged, not returned.
    #[error("internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// HTTP status and wire `status` string for this error.
    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            Self::BadRequest(_) => (StatusCode::BAD_REQUEST, "ERR"),
            Self::Unauthorized => (StatusCode::UNAUTHORIZED, "INV_AUTH"),
            Self::Duplicate => (StatusCode::OK, "DUPLICATE"),
            Self::NotFound => (StatusCode::OK, "INVALID"),
            Self::InvalidIdentifier => (StatusCode::OK, "INV_ID"),
            Self::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "ERR"),
        }
    }

    fn public_message(&self) -> String {
        match self {
            Self::BadRequest(detail) => format!("Bad Request: {detail}"),
            Self::Unauthorized => "Unauthorized".to_string(),
            Self::Duplicate => "Identifier already exists in database".to_string(),
            Self::NotFound => "Identifier not found in database".to_string(),
            Self::InvalidIdentifier => "Invalid identifier".to_string(),
            Self::Internal(_) => "Internal Server Error".to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();

        if let Self::Internal(detail) = &self {
            tracing::error!(error = %detail, "internal server error");
        }

        let body = StatusBody {
            result: false,
            status: code.to_string(),
            message: Some(self.public_message()),
        };

        (status, Json(body)).into_response()
    }
}

impl From<atl_core::ValidationError> for AppError {
    fn from(err: atl_core::ValidationError) -> Self {
        Self::BadRequest(err.to_string())
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        Self::Internal(err.to_string())
    }
}

impl From<atl_crypto::CryptoError> for AppError {
    fn from(err: atl_crypto::CryptoError) -> Self {
        Self::Internal(err.to_string())
    }
}
