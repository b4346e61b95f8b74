//! # HMAC Provider
//!
//! HS256 (HMAC with SHA-256). Registered at private scope only: computing a
//! MAC always requires the secret, so there is nothing to offer public-scope
//! callers.

use hmac::{Hmac, Mac};
use sha2::Sha256;

use crate::crypto::{CryptoKey, SubtleCrypto};
use crate::error::{Error, Result};
use crate::jose::b64;
use crate::jose::jwk::{Jwk, KTY_OCT};

type HmacSha256 = Hmac<Sha256>;

/// HS256 signer/verifier.
pub struct HmacSha256Provider;

impl SubtleCrypto for HmacSha256Provider {
    fn import_key(&self, jwk: &Jwk) -> Result<CryptoKey> {
        if jwk.kty != KTY_OCT {
            return Err(Error::KeyFormat(format!("expected an oct key, found {}", jwk.kty)));
        }
        let Some(k) = &jwk.k else {
            return Err(Error::KeyFormat("missing required field k".to_string()));
        };
        Ok(CryptoKey::Secret(b64::decode(k)?))
    }

    fn sign(&self, key: &CryptoKey, data: &[u8]) -> Result<Vec<u8>> {
        let mut mac = mac_for(key)?;
        mac.update(data);
        Ok(mac.finalize().into_bytes().to_vec())
    }

    fn verify(&self, key: &CryptoKey, signature: &[u8], data: &[u8]) -> Result<bool> {
        let mut mac = mac_for(key)?;
        mac.update(data);
        Ok(mac.verify_slice(signature).is_ok())
    }
}

fn mac_for(key: &CryptoKey) -> Result<HmacSha256> {
    let CryptoKey::Secret(secret) = key else {
        return Err(Error::KeyFormat("HS256 requires a symmetric key".to_string()));
    };
    HmacSha256::new_from_slice(secret)
        .map_err(|e| Error::KeyFormat(format!("invalid HMAC key: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mac_round_trip() {
        let provider = HmacSha256Provider;
        let key = provider
            .import_key(&Jwk {
                kty: KTY_OCT.to_string(),
                k: Some(b64::encode(b"a shared secret")),
                ..Jwk::default()
            })
            .expect("should import");

        let tag = provider.sign(&key, b"data").expect("should sign");
        assert_eq!(tag.len(), 32);
        assert!(provider.verify(&key, &tag, b"data").expect("should verify"));
        assert!(!provider.verify(&key, &tag, b"tampered").expect("should verify"));
    }

    #[test]
    fn rejects_non_oct_keys() {
        let provider = HmacSha256Provider;
        let err = provider.import_key(&Jwk {
            kty: "EC".to_string(),
            ..Jwk::default()
        });
        assert!(matches!(err, Err(Error::KeyFormat(_))));
    }
}
