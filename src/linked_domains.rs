//! # Linked Domains
//!
//! Verifies the web domains a DID claims to control. A DID's document may
//! advertise `LinkedDomains` services; each named domain hosts a well-known
//! configuration document containing signed domain-linkage credentials. A
//! domain is verified when one of its credentials asserts the DID↔domain
//! binding and carries a valid signature from a key resolvable from the same
//! DID.
//!
//! Candidate domains are tried in document order. A network or parse failure
//! on one candidate is non-fatal (the next candidate is tried) and only
//! exhausting every candidate yields an unverified result.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::core::Kind;
use crate::crypto::CryptoRegistry;
use crate::did::{HttpFetch, Resolver};
use crate::error::ResolutionError;
use crate::jose::jwk::PublicKey;
use crate::jose::jws::JwsToken;

/// Location of the well-known configuration document, relative to a domain
/// root.
pub const WELL_KNOWN_CONFIG_PATH: &str = ".well-known/did-configuration.json";

/// Outcome of linked-domain verification for a DID.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LinkedDomainResult {
    /// A domain's configuration document proved the binding.
    Verified {
        /// The verified domain.
        domain_url: String,
    },

    /// No domain could be verified. The URL is the first candidate, or empty
    /// when the DID advertises none.
    Unverified {
        /// The first candidate domain, or empty.
        domain_url: String,
    },
}

/// A well-known DID configuration document.
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct WellKnownConfig {
    /// JSON-LD context of the configuration.
    #[serde(rename = "@context", default, skip_serializing_if = "Option::is_none")]
    pub context: Option<Kind<Value>>,

    /// Compact-serialized domain-linkage credential JWTs.
    #[serde(rename = "linked_dids", default)]
    pub linked_dids: Vec<String>,
}

/// Claims of a domain-linkage credential JWT.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct DomainLinkageCredential {
    /// The bound DID.
    pub sub: String,

    /// The issuing DID; for a valid linkage, the same as `sub`.
    pub iss: String,

    /// Not-before, seconds since the epoch.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nbf: Option<i64>,

    /// Expiry, seconds since the epoch.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exp: Option<i64>,

    /// The credential body.
    pub vc: DomainLinkageVc,
}

/// Body of a domain-linkage credential.
#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DomainLinkageVc {
    /// JSON-LD context.
    #[serde(rename = "@context", default, skip_serializing_if = "Option::is_none")]
    pub context: Option<Value>,

    /// Credential types; includes `DomainLinkageCredential`.
    #[serde(rename = "type", default)]
    pub type_: Vec<String>,

    /// The asserted binding.
    pub credential_subject: DomainLinkageSubject,
}

/// The DID↔domain binding a credential asserts.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct DomainLinkageSubject {
    /// The bound DID.
    pub id: String,

    /// The bound web origin.
    pub origin: String,
}

/// Resolves a DID's linked-domain services and validates their domain-linkage
/// credentials.
pub struct LinkedDomainsService<R, F> {
    resolver: R,
    fetcher: F,
}

impl<R: Resolver, F: HttpFetch> LinkedDomainsService<R, F> {
    /// Create a service over the given resolver and fetcher.
    pub const fn new(resolver: R, fetcher: F) -> Self {
        Self { resolver, fetcher }
    }

    /// Resolve the DID and verify its linked domains in order, the first
    /// validating candidate winning.
    ///
    /// # Errors
    ///
    /// Returns a [`ResolutionError`] only when the DID itself cannot be
    /// resolved. Per-candidate fetch and validation failures are non-fatal.
    pub async fn fetch_and_verify_linked_domains(
        &self, did: &str, crypto: &CryptoRegistry,
    ) -> Result<LinkedDomainResult, ResolutionError> {
        let document = self.resolver.resolve(did).await?;
        let domains = document.linked_domain_urls();
        if domains.is_empty() {
            return Ok(LinkedDomainResult::Unverified {
                domain_url: String::new(),
            });
        }

        let candidates = document.verification_keys();
        for domain in &domains {
            match self.verify_domain(domain, did, &candidates, crypto).await {
                Ok(true) => {
                    return Ok(LinkedDomainResult::Verified {
                        domain_url: domain.clone(),
                    });
                }
                Ok(false) => {
                    tracing::debug!("no valid linkage credential for {domain}");
                }
                Err(e) => {
                    tracing::debug!("candidate domain {domain} failed: {e}");
                }
            }
        }

        Ok(LinkedDomainResult::Unverified {
            domain_url: domains[0].clone(),
        })
    }

    async fn verify_domain(
        &self, domain: &str, did: &str, candidates: &[PublicKey], crypto: &CryptoRegistry,
    ) -> Result<bool, ResolutionError> {
        let config = self.well_known_config(domain).await?;
        Ok(config
            .linked_dids
            .iter()
            .any(|jwt| validate_credential(jwt, did, domain, candidates, crypto)))
    }

    async fn well_known_config(&self, domain: &str) -> Result<WellKnownConfig, ResolutionError> {
        let url = format!("{}/{WELL_KNOWN_CONFIG_PATH}", domain.trim_end_matches('/'));
        let body = self.fetcher.fetch(&url).await?;
        serde_json::from_slice(&body).map_err(|e| ResolutionError::MalformedDocument(e.to_string()))
    }
}

/// Whether a compact credential JWT asserts the DID↔domain binding and
/// carries a valid signature from one of the DID's keys.
fn validate_credential(
    jwt: &str, did: &str, domain: &str, candidates: &[PublicKey], crypto: &CryptoRegistry,
) -> bool {
    let Ok(token) = JwsToken::deserialize(jwt) else {
        return false;
    };
    let Ok(content) = token.content() else {
        return false;
    };
    let Ok(credential) = serde_json::from_slice::<DomainLinkageCredential>(&content) else {
        return false;
    };

    if credential.sub != did
        || credential.iss != did
        || credential.vc.credential_subject.id != did
    {
        return false;
    }
    let origin = credential.vc.credential_subject.origin.trim_end_matches('/');
    if origin != domain.trim_end_matches('/') {
        return false;
    }

    matches!(token.verify(crypto, None, candidates, false), Ok(true))
}
