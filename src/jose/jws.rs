//! # JWS Tokens
//!
//! The signature envelope for every request and response the crate handles.
//! A token carries one payload and zero or more signatures over it; the three
//! RFC 7515 serializations (compact, flattened JSON, general JSON) are
//! detected structurally on input and selected explicitly on output.

use std::collections::{BTreeMap, HashMap};
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::crypto::{CryptoRegistry, Scope};
use crate::error::{Error, Result};
use crate::jose::jwk::PublicKey;
use crate::jose::{b64, HEADER_ALG, HEADER_KID, UNSIGNED_PROTECTED};
use crate::keystore::KeyStore;

static COMPACT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([A-Za-z0-9_-]*)\.([A-Za-z0-9_-]*)\.([A-Za-z0-9_-]*)$")
        .expect("pattern is valid")
});

static COMPACT_UNSIGNED: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([A-Za-z0-9_-]*)\.([A-Za-z0-9_-]*)$").expect("pattern is valid")
});

/// JWS serialization formats.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum JwsFormat {
    /// `base64url(header).base64url(payload).base64url(signature)`.
    #[default]
    Compact,

    /// Single-signature JSON object.
    FlatJson,

    /// Multi-signature JSON object.
    GeneralJson,
}

/// One signature over a token's payload.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct JwsSignature {
    /// Base64url-encoded protected header JSON. The signature covers this
    /// exact encoding, so it is never re-serialized.
    #[serde(default)]
    pub protected: String,

    /// Unprotected header parameters.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub header: Option<HashMap<String, String>>,

    /// Base64url-encoded raw signature bytes.
    pub signature: String,
}

impl JwsSignature {
    /// The decoded protected header parameters.
    ///
    /// # Errors
    ///
    /// Returns [`Error::TokenFormat`] if the protected header is not
    /// base64url-encoded JSON.
    pub fn protected_header(&self) -> Result<HashMap<String, Value>> {
        if self.protected.is_empty() {
            return Ok(HashMap::new());
        }
        let bytes = b64::decode(&self.protected)
            .map_err(|_| Error::TokenFormat("protected header is not base64url".to_string()))?;
        serde_json::from_slice(&bytes)
            .map_err(|e| Error::TokenFormat(format!("protected header is not JSON: {e}")))
    }

    /// The signature's key ID, from the protected or unprotected header.
    ///
    /// # Errors
    ///
    /// Returns [`Error::TokenFormat`] if the protected header cannot be
    /// decoded.
    pub fn kid(&self) -> Result<Option<String>> {
        self.param(HEADER_KID)
    }

    /// The signature's algorithm, from the protected or unprotected header.
    ///
    /// # Errors
    ///
    /// Returns [`Error::TokenFormat`] if the protected header cannot be
    /// decoded.
    pub fn alg(&self) -> Result<Option<String>> {
        self.param(HEADER_ALG)
    }

    fn param(&self, name: &str) -> Result<Option<String>> {
        let protected = self.protected_header()?;
        if let Some(Value::String(value)) = protected.get(name) {
            return Ok(Some(value.clone()));
        }
        Ok(self.header.as_ref().and_then(|h| h.get(name).cloned()))
    }
}

/// Wire form of a flattened-JSON JWS.
#[derive(Deserialize, Serialize)]
struct JwsFlatJson {
    #[serde(default)]
    protected: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    header: Option<HashMap<String, String>>,
    payload: String,
    signature: String,
}

/// Wire form of a general-JSON JWS.
#[derive(Deserialize, Serialize)]
struct JwsGeneralJson {
    payload: String,
    signatures: Vec<JwsSignature>,
}

/// A JWS token: one payload, zero or more signatures over it.
///
/// Constructed either empty-with-payload (then signed) or fully populated
/// from wire text. Signing appends; nothing else mutates a token. A token is
/// not `Sync`-safe to sign concurrently; signature appends must be
/// serialized by the owner.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct JwsToken {
    payload: String,
    signatures: Vec<JwsSignature>,
}

impl JwsToken {
    /// Create an unsigned token over the given content.
    #[must_use]
    pub fn new(content: &[u8]) -> Self {
        Self {
            payload: b64::encode(content),
            signatures: Vec::new(),
        }
    }

    /// Create an unsigned token over UTF-8 content.
    #[must_use]
    pub fn from_content(content: &str) -> Self {
        Self::new(content.as_bytes())
    }

    /// The base64url-encoded payload shared by all signatures.
    #[must_use]
    pub fn payload(&self) -> &str {
        &self.payload
    }

    /// The token's signatures, in the order they were attached.
    #[must_use]
    pub fn signatures(&self) -> &[JwsSignature] {
        &self.signatures
    }

    /// Parse wire text, detecting the serialization structurally: three
    /// dot-separated base64url segments are compact; a JSON object with a
    /// `signatures` array is general; one with a singular `signature` is
    /// flattened. A compact token with an empty signature segment parses to
    /// an unsigned token. It can never verify.
    ///
    /// # Errors
    ///
    /// Returns [`Error::TokenFormat`] for anything else.
    pub fn deserialize(text: &str) -> Result<Self> {
        let text = text.trim();

        if let Some(caps) = COMPACT.captures(text) {
            let signature = &caps[3];
            let signatures = if signature.is_empty() {
                Vec::new()
            } else {
                vec![JwsSignature {
                    protected: caps[1].to_string(),
                    header: None,
                    signature: signature.to_string(),
                }]
            };
            return Ok(Self {
                payload: caps[2].to_string(),
                signatures,
            });
        }

        // An absent signature segment is an unsigned token.
        if let Some(caps) = COMPACT_UNSIGNED.captures(text) {
            return Ok(Self {
                payload: caps[2].to_string(),
                signatures: Vec::new(),
            });
        }

        let lowered = text.to_lowercase();
        if lowered.contains("\"signatures\"") {
            let general: JwsGeneralJson = serde_json::from_str(text)
                .map_err(|e| Error::TokenFormat(format!("invalid general JSON: {e}")))?;
            return Ok(Self {
                payload: general.payload,
                signatures: general.signatures,
            });
        }
        if lowered.contains("\"signature\"") {
            let flat: JwsFlatJson = serde_json::from_str(text)
                .map_err(|e| Error::TokenFormat(format!("invalid flattened JSON: {e}")))?;
            return Ok(Self {
                payload: flat.payload,
                signatures: vec![JwsSignature {
                    protected: flat.protected,
                    header: flat.header,
                    signature: flat.signature,
                }],
            });
        }

        Err(Error::TokenFormat("unrecognized serialization".to_string()))
    }

    /// Append a signature using the referenced private key.
    ///
    /// The algorithm is taken from `headers` when supplied, otherwise from
    /// the key's declared algorithm. The protected header is encoded once and
    /// that exact encoding is what gets signed, so producer and verifier
    /// always agree on the signature input. Multiple calls append multiple
    /// signatures over the same payload.
    ///
    /// # Errors
    ///
    /// Returns [`Error::KeyNotFound`] if the key store does not hold the
    /// reference, [`Error::KeyAlgorithmMissing`] if neither the headers nor
    /// the key declare an algorithm, and [`Error::AlgorithmNotSupported`] if
    /// no private-scope signer is registered for it.
    pub fn sign(
        &mut self, key_ref: &str, keystore: &dyn KeyStore, crypto: &CryptoRegistry,
        headers: &HashMap<String, String>,
    ) -> Result<()> {
        let key = keystore.private_key(key_ref)?;

        let mut protected = BTreeMap::new();
        let alg = match headers.get(HEADER_ALG) {
            Some(alg) => alg.clone(),
            None => key
                .alg
                .clone()
                .ok_or_else(|| Error::KeyAlgorithmMissing(key_ref.to_string()))?,
        };
        protected.insert(HEADER_ALG.to_string(), alg.clone());
        if !headers.contains_key(HEADER_KID) && !key.kid.is_empty() {
            protected.insert(HEADER_KID.to_string(), key.kid.clone());
        }
        for (name, value) in headers {
            protected.insert(name.clone(), value.clone());
        }

        let encoded_protected = b64::encode(&serde_json::to_vec(&protected)?);
        let signature_input = format!("{encoded_protected}.{}", self.payload);

        let signer = crypto.signer(&alg, Scope::Private)?;
        let crypto_key = signer.import_key(&key.to_jwk())?;
        let signature = signer.sign(&crypto_key, signature_input.as_bytes())?;

        self.signatures.push(JwsSignature {
            protected: encoded_protected,
            header: None,
            signature: b64::encode(&signature),
        });
        Ok(())
    }

    /// Serialize the token in the requested format.
    ///
    /// # Errors
    ///
    /// Returns [`Error::SignatureCount`] when the format cannot represent the
    /// token's signature count: compact takes at most one (an unsigned token
    /// serializes to the canonical `"none"` form), flattened exactly one,
    /// general at least one.
    pub fn serialize(&self, format: JwsFormat) -> Result<String> {
        match format {
            JwsFormat::Compact => match self.signatures.as_slice() {
                [] => Ok(format!("{UNSIGNED_PROTECTED}.{}", self.payload)),
                [signature] => {
                    Ok(format!("{}.{}.{}", signature.protected, self.payload, signature.signature))
                }
                _ => Err(Error::SignatureCount(format!(
                    "compact serialization requires at most one signature, token has {}",
                    self.signatures.len()
                ))),
            },
            JwsFormat::FlatJson => {
                let [signature] = self.signatures.as_slice() else {
                    return Err(Error::SignatureCount(format!(
                        "flattened serialization requires exactly one signature, token has {}",
                        self.signatures.len()
                    )));
                };
                Ok(serde_json::to_string(&JwsFlatJson {
                    protected: signature.protected.clone(),
                    header: signature.header.clone(),
                    payload: self.payload.clone(),
                    signature: signature.signature.clone(),
                })?)
            }
            JwsFormat::GeneralJson => {
                if self.signatures.is_empty() {
                    return Err(Error::SignatureCount(
                        "general serialization requires at least one signature".to_string(),
                    ));
                }
                Ok(serde_json::to_string(&JwsGeneralJson {
                    payload: self.payload.clone(),
                    signatures: self.signatures.clone(),
                })?)
            }
        }
    }

    /// Verify the token's signatures.
    ///
    /// Each signature's verification key is chosen by its `kid`: the trust
    /// store is consulted by local fragment first, then `candidates` by exact
    /// kid match, then by suffix match (interop shim for fragment-only
    /// references), then the first candidate if any. With `require_all` the
    /// result is the conjunction over all signatures; otherwise any one valid
    /// signature suffices, the multi-issuer case where only one signer's
    /// attestation is required.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Signature`] if the token has no signatures (an
    /// unsigned token never vacuously verifies) or a signature declares no
    /// algorithm, and [`Error::AlgorithmNotSupported`] if no public-scope
    /// verifier is registered for a declared algorithm.
    pub fn verify(
        &self, crypto: &CryptoRegistry, keystore: Option<&dyn KeyStore>,
        candidates: &[PublicKey], require_all: bool,
    ) -> Result<bool> {
        if self.signatures.is_empty() {
            return Err(Error::Signature("token contains no signatures to verify".to_string()));
        }

        let mut all = true;
        let mut any = false;
        for signature in &self.signatures {
            let valid = self.verify_signature(crypto, keystore, candidates, signature)?;
            all &= valid;
            any |= valid;
        }
        Ok(if require_all { all } else { any })
    }

    fn verify_signature(
        &self, crypto: &CryptoRegistry, keystore: Option<&dyn KeyStore>,
        candidates: &[PublicKey], signature: &JwsSignature,
    ) -> Result<bool> {
        let full_kid = signature.kid()?.unwrap_or_default();
        // Strip any DID prefix, leaving the document-local fragment.
        let fragment = full_kid.split('#').next_back().unwrap_or_default();

        let key = keystore
            .and_then(|ks| ks.public_key_by_id(fragment))
            .or_else(|| candidates.iter().find(|k| k.kid == full_kid).cloned())
            .or_else(|| candidates.iter().find(|k| k.matches(fragment)).cloned())
            .or_else(|| candidates.first().cloned());
        let Some(key) = key else {
            return Ok(false);
        };

        let Some(alg) = signature.alg()? else {
            return Err(Error::Signature("signature declares no algorithm".to_string()));
        };
        let verifier = crypto.verifier(&alg, Scope::Public)?;
        let crypto_key = verifier.import_key(&key.to_jwk())?;
        let raw_signature = b64::decode(&signature.signature)?;
        let signature_input = format!("{}.{}", signature.protected, self.payload);
        verifier.verify(&crypto_key, &raw_signature, signature_input.as_bytes())
    }

    /// The decoded payload bytes. Pure accessor.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Encoding`] if the payload is not valid base64url.
    pub fn content(&self) -> Result<Vec<u8>> {
        b64::decode(&self.payload)
    }
}
