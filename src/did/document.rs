//! # DID Documents
//!
//! A DID document describes the keys and service endpoints of a DID subject.
//! Documents are produced by a [`crate::did::Resolver`], are read-only to all
//! consumers, and are superseded, never mutated, by re-resolution.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::core::{Kind, OneMany};
use crate::did::service::{Service, LINKED_DOMAINS};
use crate::jose::jwk::{Jwk, PublicKey};

/// A resolved DID document.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct Document {
    /// JSON-LD context of the document.
    #[serde(rename = "@context", skip_serializing_if = "Option::is_none")]
    pub context: Option<OneMany<Kind<Value>>>,

    /// The DID this document describes. Never empty in a valid document.
    pub id: String,

    /// Public keys of the subject, in document order. Both the legacy
    /// `publicKey` and the `verificationMethod` field names are accepted.
    #[serde(rename = "publicKey", alias = "verificationMethod", skip_serializing_if = "Option::is_none")]
    pub public_key: Option<Vec<DocumentKey>>,

    /// Services advertised by the subject, in document order.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service: Option<Vec<Service>>,

    /// Timestamp of the create operation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created: Option<DateTime<Utc>>,

    /// Timestamp of the last update operation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated: Option<DateTime<Utc>>,
}

/// A public key entry in a DID document.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DocumentKey {
    /// Key identifier. When not fully qualified, implicitly scoped to the
    /// containing document's DID.
    pub id: String,

    /// Verification method type, e.g. `EcdsaSecp256k1VerificationKey2019`.
    #[serde(rename = "type")]
    pub type_: String,

    /// The DID controlling this key.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub controller: Option<String>,

    /// The key material as a JWK.
    pub public_key_jwk: Jwk,
}

impl Document {
    /// The document's public keys as verification candidates, in document
    /// order. Entries whose JWK cannot be interpreted are skipped. A key
    /// without its own `kid` takes the entry's ID, qualified with the
    /// document's DID when the entry ID is a bare fragment.
    #[must_use]
    pub fn verification_keys(&self) -> Vec<PublicKey> {
        let Some(entries) = &self.public_key else {
            return Vec::new();
        };
        let mut keys = Vec::new();
        for entry in entries {
            match PublicKey::from_jwk(&entry.public_key_jwk) {
                Ok(mut key) => {
                    if key.kid.is_empty() {
                        key.kid = self.qualify(&entry.id);
                    }
                    keys.push(key);
                }
                Err(e) => {
                    tracing::debug!("skipping unusable document key {}: {e}", entry.id);
                }
            }
        }
        keys
    }

    /// Candidate linked-domain URLs, in document order: the endpoints of
    /// every service of type `LinkedDomains`.
    #[must_use]
    pub fn linked_domain_urls(&self) -> Vec<String> {
        let Some(services) = &self.service else {
            return Vec::new();
        };
        services
            .iter()
            .filter(|s| s.type_ == LINKED_DOMAINS)
            .flat_map(Service::endpoint_urls)
            .collect()
    }

    fn qualify(&self, id: &str) -> String {
        if id.starts_with('#') {
            format!("{}{id}", self.id)
        } else {
            id.to_string()
        }
    }
}
