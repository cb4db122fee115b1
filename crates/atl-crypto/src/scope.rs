//! # Tenant Scope
//!
//! The only place an access credential becomes envelope key material.
//!
//! ```text
//! passphrase = hex(SHA-256(credential || tenant_id))
//! envelope   = seal(address, passphrase)
//! ```
//!
//! Every address a tenant stores is sealed under the same passphrase, each
//! with its own random salt. Rotating a tenant's credential therefore
//! requires re-sealing that tenant's addresses.

use atl_core::{sha256_hex, AccessCredential, TenantId};
use zeroize::Zeroizing;

use crate::envelope::{open, seal};
use crate::error::CryptoError;
use crate::kdf::KdfParams;

/// Derive the envelope passphrase for `tenant` from `credential`.
pub fn tenant_passphrase(credential: &AccessCredential, tenant: &TenantId) -> Zeroizing<String> {
    let mut material = Zeroizing::new(String::with_capacity(
        credential.expose_secret().len() + tenant.as_str().len(),
    ));
    material.push_str(credential.expose_secret());
    material.push_str(tenant.as_str());
    Zeroizing::new(sha256_hex(&material))
}

/// Seal `address` for `tenant`.
pub fn seal_address(
    address: &str,
    credential: &AccessCredential,
    tenant: &TenantId,
    params: &KdfParams,
) -> Result<String, CryptoError> {
    let passphrase = tenant_passphrase(credential, tenant);
    seal(address, &passphrase, params)
}

/// Open an envelope sealed by [`seal_address`] for the same tenant and
/// credential.
pub fn open_address(
    envelope: &str,
    credential: &AccessCredential,
    tenant: &TenantId,
    params: &KdfParams,
) -> Result<String, CryptoError> {
    let passphrase = tenant_passphrase(credential, tenant);
    open(envelope, &passphrase, params)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cred(s: &str) -> AccessCredential {
        AccessCredential::new(s).unwrap()
    }

    fn tenant(s: &str) -> TenantId {
        TenantId::new(s).unwrap()
    }

    #[test]
    fn passphrase_reference_vector() {
        let p = tenant_passphrase(&cred("auth-token-42"), &tenant("proj1"));
        assert_eq!(
            p.as_str(),
            "4a405aa7e3c4b31a7c995e8415c7482e6644b9ab7d594e86d8eb33c4895c0859"
        );
    }

    #[test]
    fn reference_tenant_envelope_opens() {
        let env = "AAECAwQFBgcICQoLDA0OD03QLDF7eKwUZ6YnEBESExQVFhcYGRobHB0eH3+XSgVHtfIsDlhCKW2vfgs=";
        let out = open_address(env, &cred("auth-token-42"), &tenant("proj1"), &KdfParams::default())
            .unwrap();
        assert_eq!(out, "123 Main St");
    }

    #[test]
    fn passphrase_depends_on_tenant_and_credential() {
        let base = tenant_passphrase(&cred("k"), &tenant("a"));
        assert_ne!(base, tenant_passphrase(&cred("k"), &tenant("b")));
        assert_ne!(base, tenant_passphrase(&cred("k2"), &tenant("a")));
    }

    #[test]
    fn other_tenant_cannot_open() {
        let params = KdfParams::with_iterations(10);
        let env = seal_address("123 Main St", &cred("k"), &tenant("a"), &params).unwrap();
        assert_eq!(
            open_address(&env, &cred("k"), &tenant("b"), &params),
            Err(CryptoError::Integrity)
        );
        assert_eq!(
            open_address(&env, &cred("k"), &tenant("a"), &params).unwrap(),
            "123 Main St"
        );
    }
}
