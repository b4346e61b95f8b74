//! # Secp256k1 Provider
//!
//! ES256K: ECDSA over secp256k1 with SHA-256, producing the raw 64-byte
//! `r || s` signatures JWS carries.

use k256::ecdsa::signature::{Signer, Verifier};
use k256::ecdsa::{Signature, SigningKey, VerifyingKey};
use k256::elliptic_curve::sec1::ToEncodedPoint;
use k256::EncodedPoint;

use crate::crypto::{CryptoKey, SubtleCrypto};
use crate::error::{Error, Result};
use crate::jose::b64;
use crate::jose::jwk::{Jwk, KTY_EC};

/// Curve names accepted for secp256k1 key material.
pub(crate) const CURVE_NAMES: [&str; 3] = ["secp256k1", "K-256", "P-256K"];

const TAG_COMPRESSED_EVEN: u8 = 0x02;
const TAG_COMPRESSED_ODD: u8 = 0x03;
const TAG_UNCOMPRESSED: u8 = 0x04;
const TAG_HYBRID_EVEN: u8 = 0x06;
const TAG_HYBRID_ODD: u8 = 0x07;

/// ES256K signer/verifier.
pub struct Secp256k1Provider;

impl SubtleCrypto for Secp256k1Provider {
    fn import_key(&self, jwk: &Jwk) -> Result<CryptoKey> {
        if jwk.kty != KTY_EC {
            return Err(Error::KeyFormat(format!("expected an EC key, found {}", jwk.kty)));
        }
        if let Some(crv) = &jwk.crv {
            if !CURVE_NAMES.contains(&crv.as_str()) {
                return Err(Error::KeyFormat(format!("unsupported curve {crv}")));
            }
        }

        if let Some(d) = &jwk.d {
            let scalar = b64::decode(d)?;
            let signing_key = SigningKey::from_slice(&scalar)
                .map_err(|e| Error::KeyFormat(format!("invalid private scalar: {e}")))?;
            return Ok(CryptoKey::Secp256k1Private(signing_key));
        }

        let x = field_bytes(jwk.x.as_deref(), "x")?;
        let y = field_bytes(jwk.y.as_deref(), "y")?;
        let point = EncodedPoint::from_affine_coordinates(&x.into(), &y.into(), false);
        let verifying_key = VerifyingKey::from_encoded_point(&point)
            .map_err(|e| Error::KeyFormat(format!("invalid public point: {e}")))?;
        Ok(CryptoKey::Secp256k1Public(verifying_key))
    }

    fn sign(&self, key: &CryptoKey, data: &[u8]) -> Result<Vec<u8>> {
        let CryptoKey::Secp256k1Private(signing_key) = key else {
            return Err(Error::KeyFormat("signing requires a secp256k1 private key".to_string()));
        };
        let signature: Signature = signing_key.sign(data);
        Ok(signature.to_bytes().to_vec())
    }

    fn verify(&self, key: &CryptoKey, signature: &[u8], data: &[u8]) -> Result<bool> {
        let verifying_key = match key {
            CryptoKey::Secp256k1Public(vk) => *vk,
            CryptoKey::Secp256k1Private(sk) => *sk.verifying_key(),
            CryptoKey::Secret(_) => {
                return Err(Error::KeyFormat(
                    "verification requires a secp256k1 key".to_string(),
                ));
            }
        };
        let Ok(signature) = Signature::from_slice(signature) else {
            return Ok(false);
        };
        Ok(verifying_key.verify(data, &signature).is_ok())
    }
}

/// Extract affine `(x, y)` coordinates from a SEC1-encoded secp256k1 point.
///
/// Uncompressed (`0x04`) and hybrid (`0x06`/`0x07`) 65-byte encodings are
/// sliced directly; compressed (`0x02`/`0x03`) 33-byte encodings are
/// decompressed on the curve.
///
/// # Errors
///
/// Returns [`Error::PairwiseKey`] if the encoding is malformed or the point
/// is not on the curve.
pub fn point_to_xy(sec1: &[u8]) -> Result<(Vec<u8>, Vec<u8>)> {
    match sec1.first() {
        Some(&TAG_UNCOMPRESSED | &TAG_HYBRID_EVEN | &TAG_HYBRID_ODD) if sec1.len() == 65 => {
            Ok((sec1[1..33].to_vec(), sec1[33..65].to_vec()))
        }
        Some(&TAG_COMPRESSED_EVEN | &TAG_COMPRESSED_ODD) if sec1.len() == 33 => {
            let point = k256::PublicKey::from_sec1_bytes(sec1)
                .map_err(|e| Error::PairwiseKey(format!("invalid compressed point: {e}")))?;
            let uncompressed = point.to_encoded_point(false);
            let bytes = uncompressed.as_bytes();
            Ok((bytes[1..33].to_vec(), bytes[33..65].to_vec()))
        }
        _ => Err(Error::PairwiseKey("public key improperly formatted".to_string())),
    }
}

fn field_bytes(value: Option<&str>, name: &str) -> Result<[u8; 32]> {
    let Some(value) = value else {
        return Err(Error::KeyFormat(format!("missing required field {name}")));
    };
    let bytes = b64::decode(value)?;
    if bytes.len() > 32 {
        return Err(Error::KeyFormat(format!("field {name} exceeds 32 bytes")));
    }
    let mut buf = [0u8; 32];
    buf[32 - bytes.len()..].copy_from_slice(&bytes);
    Ok(buf)
}

#[cfg(test)]
mod tests {
    use rand::rngs::OsRng;

    use super::*;

    #[test]
    fn sign_and_verify() {
        let signing_key = SigningKey::random(&mut OsRng);
        let point = signing_key.verifying_key().to_encoded_point(false);
        let (x, y) = point_to_xy(point.as_bytes()).expect("should extract");

        let private = Jwk {
            kty: KTY_EC.to_string(),
            crv: Some("secp256k1".to_string()),
            x: Some(b64::encode(&x)),
            y: Some(b64::encode(&y)),
            d: Some(b64::encode(&signing_key.to_bytes())),
            ..Jwk::default()
        };
        let public = Jwk {
            d: None,
            ..private.clone()
        };

        let provider = Secp256k1Provider;
        let signer = provider.import_key(&private).expect("should import");
        let verifier = provider.import_key(&public).expect("should import");

        let msg = b"signature input";
        let sig = provider.sign(&signer, msg).expect("should sign");
        assert_eq!(sig.len(), 64);
        assert!(provider.verify(&verifier, &sig, msg).expect("should verify"));
        assert!(!provider.verify(&verifier, &sig, b"other input").expect("should verify"));
    }

    #[test]
    fn decompresses_points() {
        let signing_key = SigningKey::random(&mut OsRng);
        let uncompressed = signing_key.verifying_key().to_encoded_point(false);
        let compressed = signing_key.verifying_key().to_encoded_point(true);

        let from_full = point_to_xy(uncompressed.as_bytes()).expect("should extract");
        let from_compressed = point_to_xy(compressed.as_bytes()).expect("should decompress");
        assert_eq!(from_full, from_compressed);
    }

    #[test]
    fn rejects_malformed_points() {
        assert!(point_to_xy(&[]).is_err());
        assert!(point_to_xy(&[0x05; 65]).is_err());
        assert!(point_to_xy(&[0x04; 10]).is_err());
    }
}
