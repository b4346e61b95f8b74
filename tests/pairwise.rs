//! Tests for the pairwise send path: derive a per-relying-party key, sign
//! with it, verify with its public projection.

use std::collections::HashMap;

use did_auth::crypto::pairwise;
use did_auth::{CryptoRegistry, Error, JwsFormat, JwsToken, MemoryKeyStore};

#[test]
fn derived_key_signs_a_presentable_token() {
    let crypto = CryptoRegistry::standard();
    let mut key = pairwise::derive(&crypto, b"master key material", "did:example:rp", "secp256k1")
        .expect("should derive");
    key.kid = "did:example:pairwise#sig-1".to_string();
    let public = key.public_key().expect("should project");

    let store = MemoryKeyStore::new();
    store.insert_private("pairwise", key);

    let mut token = JwsToken::from_content(r#"{"iss":"did:example:pairwise"}"#);
    token.sign("pairwise", &store, &crypto, &HashMap::new()).expect("should sign");
    let wire = token.serialize(JwsFormat::Compact).expect("should serialize");

    let parsed = JwsToken::deserialize(&wire).expect("should deserialize");
    assert!(parsed.verify(&crypto, None, &[public], false).expect("should verify"));
}

#[test]
fn derivation_is_stable_across_stores() {
    // Multi-device consistency: two independent derivations of the same
    // (master, peer) pair produce interchangeable keys.
    let crypto = CryptoRegistry::standard();
    let device_a = pairwise::derive(&crypto, b"shared master", "did:example:rp", "K-256")
        .expect("should derive");
    let device_b = pairwise::derive(&crypto, b"shared master", "did:example:rp", "K-256")
        .expect("should derive");
    assert_eq!(device_a.material, device_b.material);
}

#[test]
fn non_k256_targets_are_rejected() {
    let crypto = CryptoRegistry::standard();
    let err = pairwise::derive(&crypto, b"master", "did:example:rp", "P-256");
    assert!(matches!(err, Err(Error::PairwiseKeyUnsupportedCurve(_))));
}
