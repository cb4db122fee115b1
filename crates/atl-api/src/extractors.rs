//! # Request Field Extraction & Validation
//!
//! Translation requests carry their fields as a JSON body. Lookups may
//! instead put them in the query string, since many HTTP clients drop GET
//! bodies. [`extract_fields`] reads whichever is present: a non-blank body
//! wins, then the query string.
//!
//! The tenant gate buffers the body before handlers run, so handlers
//! receive it as `Bytes` and call these helpers directly.
//!
//! `projectID` may be a JSON string or a JSON number; numbers are kept in
//! their decimal text form. Any other JSON type is a 400.

use axum::extract::Query;
use axum::http::Uri;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};

use atl_core::ValidationError;

use crate::error::AppError;

/// Request DTOs that convert into validated domain values.
pub trait Validate: Sized {
    /// The validated form.
    type Valid;

    /// Check business rules and build the validated form.
    fn validate(self) -> Result<Self::Valid, ValidationError>;
}

#[derive(Deserialize)]
#[serde(untagged)]
enum TenantValue {
    Text(String),
    Number(serde_json::Number),
}

impl From<TenantValue> for String {
    fn from(value: TenantValue) -> Self {
        match value {
            TenantValue::Text(s) => s,
            TenantValue::Number(n) => n.to_string(),
        }
    }
}

/// `deserialize_with` helper for a required `projectID`.
pub fn tenant_field<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    TenantValue::deserialize(deserializer).map(String::from)
}

/// `deserialize_with` helper for an optional `projectID`. `null` counts as absent.
pub fn optional_tenant_field<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<String>, D::Error> {
    Option::<TenantValue>::deserialize(deserializer).map(|v| v.map(String::from))
}

/// Deserialize `T` from the JSON body, or from the query string when the
/// body is blank. Failures become [`AppError::BadRequest`].
pub fn extract_fields<T: DeserializeOwned>(uri: &Uri, body: &[u8]) -> Result<T, AppError> {
    if !body.iter().all(u8::is_ascii_whitespace) {
        return serde_json::from_slice(body)
            .map_err(|e| AppError::BadRequest(format!("invalid JSON body: {e}")));
    }
    if uri.query().is_some() {
        return Query::<T>::try_from_uri(uri)
            .map(|Query(v)| v)
            .map_err(|e| AppError::BadRequest(e.body_text()));
    }
    serde_json::from_slice(b"{}").map_err(|e| AppError::BadRequest(e.to_string()))
}

/// [`extract_fields`] followed by [`Validate::validate`].
pub fn extract_validated<T>(uri: &Uri, body: &[u8]) -> Result<T::Valid, AppError>
where
    T: DeserializeOwned + Validate,
{
    let value: T = extract_fields(uri, body)?;
    Ok(value.validate()?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Deserialize)]
    struct Fields {
        identifier: String,
        #[serde(rename = "projectID", default, deserialize_with = "optional_tenant_field")]
        project_id: Option<String>,
    }

    impl Validate for Fields {
        type Valid = String;

        fn validate(self) -> Result<String, ValidationError> {
            if self.identifier.is_empty() {
                return Err(ValidationError::Empty { field: "identifier" });
            }
            Ok(self.identifier)
        }
    }

    fn uri(s: &str) -> Uri {
        s.parse().unwrap()
    }

    #[test]
    fn body_is_preferred() {
        let p: Fields = extract_fields(
            &uri("/t?identifier=from-query"),
            br#"{"identifier":"from-body","projectID":"p1"}"#,
        )
        .unwrap();
        assert_eq!(p.identifier, "from-body");
        assert_eq!(p.project_id.as_deref(), Some("p1"));
    }

    #[test]
    fn query_used_when_body_blank() {
        let p: Fields = extract_fields(&uri("/t?identifier=abc&projectID=p1"), b"  \n").unwrap();
        assert_eq!(p.identifier, "abc");
        assert_eq!(p.project_id.as_deref(), Some("p1"));
    }

    #[test]
    fn missing_field_is_bad_request() {
        let err = extract_fields::<Fields>(&uri("/t"), b"").unwrap_err();
        assert!(matches!(err, AppError::BadRequest(msg) if msg.contains("identifier")));
    }

    #[test]
    fn malformed_json_is_bad_request() {
        assert!(matches!(
            extract_fields::<Fields>(&uri("/t"), b"{not json"),
            Err(AppError::BadRequest(_))
        ));
    }

    #[test]
    fn validation_failure_is_bad_request() {
        assert!(matches!(
            extract_validated::<Fields>(&uri("/t"), br#"{"identifier":""}"#),
            Err(AppError::BadRequest(_))
        ));
        assert_eq!(
            extract_validated::<Fields>(&uri("/t"), br#"{"identifier":"x"}"#).unwrap(),
            "x"
        );
    }

    #[test]
    fn numeric_project_id_is_accepted() {
        let p: Fields = extract_fields(&uri("/t"), br#"{"identifier":"a","projectID":7}"#).unwrap();
        assert_eq!(p.project_id.as_deref(), Some("7"));

        let p: Fields = extract_fields(&uri("/t?identifier=a&projectID=7"), b"").unwrap();
        assert_eq!(p.project_id.as_deref(), Some("7"));
    }

    #[test]
    fn null_project_id_is_absent() {
        let p: Fields = extract_fields(&uri("/t"), br#"{"identifier":"a","projectID":null}"#).unwrap();
        assert_eq!(p.project_id, None);
    }

    #[test]
    fn non_scalar_project_id_is_bad_request() {
        for body in [
            &br#"{"identifier":"a","projectID":true}"#[..],
            br#"{"identifier":"a","projectID":["p1"]}"#,
        ] {
            assert!(matches!(
                extract_fields::<Fields>(&uri("/t"), body),
                Err(AppError::BadRequest(_))
            ));
        }
    }
}
