//! # Pairwise Keys
//!
//! Deterministic derivation of a per-relying-party key pair from master key
//! material and a peer identifier. The same user presents an unlinkable
//! identity to each relying party, while identical inputs always re-derive
//! the identical key pair, which the relying party needs to recognise the
//! derived identifier over time and across devices.

use k256::ecdsa::SigningKey;

use crate::crypto::{secp256k1, CryptoRegistry, Scope};
use crate::error::{Error, Result};
use crate::jose::b64;
use crate::jose::jwk::{Jwk, KeyOperation, PrivateKey, PrivateMaterial, KTY_OCT};
use crate::jose::{ES256K, HS256};

/// Derive a private key for the given peer on the requested curve.
///
/// The derivation seed is `HMAC-SHA256(master_key, peer_id)`, computed
/// through the registry's private-scope HS256 provider. The seed, taken as a
/// big-endian 256-bit integer, becomes the private scalar of a secp256k1 key
/// pair; the public point's affine coordinates are extracted from its SEC1
/// encoding.
///
/// # Errors
///
/// Returns [`Error::PairwiseKeyUnsupportedCurve`] for any curve outside the
/// K-256 family (RSA and other curves are explicitly unsupported), and
/// [`Error::PairwiseKey`] if the seed is out of range for the curve or the
/// public-key encoding is malformed.
pub fn derive(
    registry: &CryptoRegistry, master_key: &[u8], peer_id: &str, curve: &str,
) -> Result<PrivateKey> {
    if !secp256k1::CURVE_NAMES.contains(&curve) {
        return Err(Error::PairwiseKeyUnsupportedCurve(curve.to_string()));
    }

    let seed = pairwise_seed(registry, master_key, peer_id)?;
    let signing_key = SigningKey::from_slice(&seed)
        .map_err(|e| Error::PairwiseKey(format!("seed is not a valid scalar: {e}")))?;

    let point = signing_key.verifying_key().to_encoded_point(false);
    let (x, y) = secp256k1::point_to_xy(point.as_bytes())?;

    Ok(PrivateKey {
        kid: String::new(),
        alg: Some(ES256K.to_string()),
        key_ops: Some(vec![KeyOperation::Sign]),
        material: PrivateMaterial::EllipticCurve {
            crv: curve.to_string(),
            x: b64::encode(&x),
            y: b64::encode(&y),
            d: b64::encode(&seed),
        },
    })
}

fn pairwise_seed(registry: &CryptoRegistry, master_key: &[u8], peer_id: &str) -> Result<Vec<u8>> {
    let provider = registry.signer(HS256, Scope::Private)?;
    let seed_key = provider.import_key(&Jwk {
        kty: KTY_OCT.to_string(),
        alg: Some(HS256.to_string()),
        k: Some(b64::encode(master_key)),
        ..Jwk::default()
    })?;
    provider.sign(&seed_key, peer_id.as_bytes())
}
