//! # Key Store
//!
//! Holds private keys by reference and public keys by ID. The store is the
//! only component that hands secret material to the signing path; everything
//! else works with public projections.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use k256::ecdsa::SigningKey;
use rand::rngs::OsRng;

use crate::error::{Error, Result};
use crate::jose::jwk::{KeyOperation, PrivateKey, PrivateMaterial, PublicKey};
use crate::jose::{b64, ES256K};

/// Private-key retrieval and public-key lookup.
pub trait KeyStore: Send + Sync {
    /// Retrieve a private key by reference.
    ///
    /// # Errors
    ///
    /// Returns [`Error::KeyNotFound`] if the reference is not held.
    fn private_key(&self, key_ref: &str) -> Result<PrivateKey>;

    /// Look up a trusted public key by key ID, `None` if unknown.
    fn public_key_by_id(&self, kid: &str) -> Option<PublicKey>;
}

/// In-memory key store for wallets and tests.
#[derive(Clone, Default)]
pub struct MemoryKeyStore {
    private_keys: Arc<Mutex<HashMap<String, PrivateKey>>>,
    public_keys: Arc<Mutex<HashMap<String, PublicKey>>>,
}

impl MemoryKeyStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a private key under the given reference. The key's public half,
    /// when it has one, becomes available for lookup by its kid.
    pub fn insert_private(&self, key_ref: impl Into<String>, key: PrivateKey) {
        if let Some(public) = key.public_key() {
            if !public.kid.is_empty() {
                self.insert_public(public);
            }
        }
        self.private_keys.lock().expect("lock on private_keys failed").insert(key_ref.into(), key);
    }

    /// Store a trusted public key, keyed by its kid.
    pub fn insert_public(&self, key: PublicKey) {
        self.public_keys.lock().expect("lock on public_keys failed").insert(key.kid.clone(), key);
    }

    /// Generate a fresh secp256k1 key pair, store the private half under
    /// `kid`, and return the public half.
    ///
    /// # Errors
    ///
    /// Returns [`Error::KeyFormat`] if the generated point cannot be encoded.
    pub fn generate_secp256k1(&self, kid: impl Into<String>) -> Result<PublicKey> {
        let kid = kid.into();
        let signing_key = SigningKey::random(&mut OsRng);
        let point = signing_key.verifying_key().to_encoded_point(false);
        let bytes = point.as_bytes();
        if bytes.len() != 65 {
            return Err(Error::KeyFormat("unexpected point encoding".to_string()));
        }

        let key = PrivateKey {
            kid: kid.clone(),
            alg: Some(ES256K.to_string()),
            key_ops: Some(vec![KeyOperation::Sign]),
            material: PrivateMaterial::EllipticCurve {
                crv: "secp256k1".to_string(),
                x: b64::encode(&bytes[1..33]),
                y: b64::encode(&bytes[33..65]),
                d: b64::encode(&signing_key.to_bytes()),
            },
        };
        let public = key.public_key().expect("EC keys have a public half");
        self.insert_private(kid, key);
        Ok(public)
    }
}

impl KeyStore for MemoryKeyStore {
    fn private_key(&self, key_ref: &str) -> Result<PrivateKey> {
        self.private_keys
            .lock()
            .expect("lock on private_keys failed")
            .get(key_ref)
            .cloned()
            .ok_or_else(|| Error::KeyNotFound(key_ref.to_string()))
    }

    fn public_key_by_id(&self, kid: &str) -> Option<PublicKey> {
        self.public_keys.lock().expect("lock on public_keys failed").get(kid).cloned()
    }
}
