//! Property tests for the envelope cipher and tenant scoping.
//!
//! Iterations are kept low; the PBKDF2 cost is not what is under test.

use atl_core::{AccessCredential, TenantId};
use atl_crypto::{
    open, open_address, seal, seal_address, seal_parts, CryptoError, KdfParams, SealedParts,
    IV_SIZE, SALT_SIZE, TAG_SIZE,
};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use proptest::prelude::*;

fn params() -> KdfParams {
    KdfParams::with_iterations(2)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn open_inverts_seal(plaintext in ".{0,200}", passphrase in ".{0,64}") {
        let env = seal(&plaintext, &passphrase, &params()).unwrap();
        prop_assert_eq!(open(&env, &passphrase, &params()).unwrap(), plaintext);
    }

    #[test]
    fn envelope_length_is_plaintext_plus_fixed_segments(plaintext in proptest::collection::vec(any::<u8>(), 0..256)) {
        let parts = seal_parts(&plaintext, b"k", &params()).unwrap();
        prop_assert_eq!(parts.to_bytes().len(), plaintext.len() + IV_SIZE + SALT_SIZE + TAG_SIZE);
    }

    #[test]
    fn wrong_passphrase_never_opens(plaintext in ".{0,64}", a in "[a-z]{1,16}", b in "[a-z]{1,16}") {
        prop_assume!(a != b);
        let env = seal(&plaintext, &a, &params()).unwrap();
        prop_assert_eq!(open(&env, &b, &params()), Err(CryptoError::Integrity));
    }

    #[test]
    fn flipping_ciphertext_or_tag_bit_is_detected(
        plaintext in ".{1,64}",
        pick in any::<prop::sample::Index>(),
        bit in 0u8..8,
    ) {
        let mut raw = STANDARD.decode(seal(&plaintext, "k", &params()).unwrap()).unwrap();
        let ct_len = raw.len() - IV_SIZE - SALT_SIZE - TAG_SIZE;

        // Ciphertext bytes plus tag bytes, in raw-envelope offsets.
        let mut targets: Vec<usize> = (IV_SIZE..IV_SIZE + ct_len).collect();
        targets.extend(raw.len() - TAG_SIZE..raw.len());
        let offset = targets[pick.index(targets.len())];

        raw[offset] ^= 1 << bit;
        let tampered = STANDARD.encode(&raw);
        prop_assert_eq!(open(&tampered, "k", &params()), Err(CryptoError::Integrity));
    }

    #[test]
    fn flipping_iv_or_salt_bit_is_detected(
        pick in 0usize..(IV_SIZE + SALT_SIZE),
        bit in 0u8..8,
    ) {
        let mut raw = STANDARD.decode(seal("123 Main St", "k", &params()).unwrap()).unwrap();
        let offset = if pick < IV_SIZE {
            pick
        } else {
            raw.len() - TAG_SIZE - SALT_SIZE + (pick - IV_SIZE)
        };
        raw[offset] ^= 1 << bit;
        prop_assert!(open(&STANDARD.encode(&raw), "k", &params()).is_err());
    }

    #[test]
    fn tenants_are_isolated(address in ".{1,64}", t1 in "[a-z0-9]{1,12}", t2 in "[a-z0-9]{1,12}") {
        prop_assume!(t1 != t2);
        let cred = AccessCredential::new("shared-credential").unwrap();
        let a = TenantId::new(t1).unwrap();
        let b = TenantId::new(t2).unwrap();

        let env_a = seal_address(&address, &cred, &a, &params()).unwrap();
        let env_b = seal_address(&address, &cred, &b, &params()).unwrap();
        prop_assert_ne!(&env_a, &env_b);
        prop_assert!(open_address(&env_a, &cred, &b, &params()).is_err());
        prop_assert_eq!(open_address(&env_a, &cred, &a, &params()).unwrap(), address);
    }
}

#[test]
fn structured_form_round_trips_through_envelope_string() {
    let parts = seal_parts(b"123 Main St", b"auth-token-42", &params()).unwrap();
    let back = SealedParts::from_envelope(&parts.to_envelope()).unwrap();
    assert_eq!(back, parts);
}

#[test]
fn scenario_main_street() {
    let p = KdfParams::default();
    let env = seal("123 Main St", "auth-token-42", &p).unwrap();
    assert_eq!(open(&env, "auth-token-42", &p).unwrap(), "123 Main St");
    assert_eq!(open(&env, "auth-token-43", &p), Err(CryptoError::Integrity));
}
