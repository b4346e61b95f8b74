//! End-to-end tests for linked-domain verification.

use std::collections::HashMap;

use did_auth::did::{Document, DocumentKey, Service, ServiceEndpoint};
use did_auth::linked_domains::{
    DomainLinkageCredential, DomainLinkageSubject, DomainLinkageVc, WellKnownConfig,
};
use did_auth::{
    CryptoRegistry, HttpFetch, JwsFormat, JwsToken, LinkedDomainResult, LinkedDomainsService,
    MemoryKeyStore, PublicKey, Resolver, ResolutionError,
};

const DID: &str = "did:example:issuer";
const DOMAIN: &str = "https://issuer.example";

struct StaticResolver {
    document: Document,
}

impl Resolver for StaticResolver {
    async fn resolve(&self, did: &str) -> Result<Document, ResolutionError> {
        if did == self.document.id {
            Ok(self.document.clone())
        } else {
            Err(ResolutionError::NotFound)
        }
    }
}

struct StaticFetcher {
    responses: HashMap<String, Vec<u8>>,
}

impl HttpFetch for StaticFetcher {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, ResolutionError> {
        self.responses
            .get(url)
            .cloned()
            .ok_or_else(|| ResolutionError::Transport("connection refused".to_string()))
    }
}

fn document_with_services(public: &PublicKey, endpoints: Vec<ServiceEndpoint>) -> Document {
    let service = (!endpoints.is_empty()).then(|| {
        endpoints
            .into_iter()
            .map(|endpoint| Service {
                id: "#linkeddomains".to_string(),
                type_: "LinkedDomains".to_string(),
                service_endpoint: did_auth::core::OneMany::One(endpoint),
            })
            .collect()
    });
    Document {
        id: DID.to_string(),
        public_key: Some(vec![DocumentKey {
            id: public.kid.clone(),
            type_: "EcdsaSecp256k1VerificationKey2019".to_string(),
            controller: None,
            public_key_jwk: public.to_jwk(),
        }]),
        service,
        ..Document::default()
    }
}

fn linkage_credential(
    origin: &str, store: &MemoryKeyStore, crypto: &CryptoRegistry,
) -> String {
    let credential = DomainLinkageCredential {
        sub: DID.to_string(),
        iss: DID.to_string(),
        nbf: Some(1_603_415_664),
        exp: Some(2_392_334_064),
        vc: DomainLinkageVc {
            context: None,
            type_: vec![
                "VerifiableCredential".to_string(),
                "DomainLinkageCredential".to_string(),
            ],
            credential_subject: DomainLinkageSubject {
                id: DID.to_string(),
                origin: origin.to_string(),
            },
        },
    };

    let mut token =
        JwsToken::new(&serde_json::to_vec(&credential).expect("should serialize"));
    token
        .sign(&format!("{DID}#sig-1"), store, crypto, &HashMap::new())
        .expect("should sign");
    token.serialize(JwsFormat::Compact).expect("should serialize")
}

fn well_known_body(jwts: Vec<String>) -> Vec<u8> {
    serde_json::to_vec(&WellKnownConfig {
        context: None,
        linked_dids: jwts,
    })
    .expect("should serialize")
}

fn config_url(domain: &str) -> String {
    format!("{domain}/.well-known/did-configuration.json")
}

#[tokio::test]
async fn verifies_a_single_domain() {
    let store = MemoryKeyStore::new();
    let crypto = CryptoRegistry::standard();
    let public = store.generate_secp256k1(format!("{DID}#sig-1")).expect("should generate");

    let resolver = StaticResolver {
        document: document_with_services(
            &public,
            vec![ServiceEndpoint::Url(DOMAIN.to_string())],
        ),
    };
    let fetcher = StaticFetcher {
        responses: HashMap::from([(
            config_url(DOMAIN),
            well_known_body(vec![linkage_credential(DOMAIN, &store, &crypto)]),
        )]),
    };

    let service = LinkedDomainsService::new(resolver, fetcher);
    let result =
        service.fetch_and_verify_linked_domains(DID, &crypto).await.expect("should resolve");
    assert_eq!(result, LinkedDomainResult::Verified { domain_url: DOMAIN.to_string() });
}

#[tokio::test]
async fn verifies_an_origins_endpoint() {
    let store = MemoryKeyStore::new();
    let crypto = CryptoRegistry::standard();
    let public = store.generate_secp256k1(format!("{DID}#sig-1")).expect("should generate");

    let resolver = StaticResolver {
        document: document_with_services(
            &public,
            vec![ServiceEndpoint::Origins {
                origins: vec![DOMAIN.to_string()],
            }],
        ),
    };
    let fetcher = StaticFetcher {
        responses: HashMap::from([(
            config_url(DOMAIN),
            well_known_body(vec![linkage_credential(DOMAIN, &store, &crypto)]),
        )]),
    };

    let service = LinkedDomainsService::new(resolver, fetcher);
    let result =
        service.fetch_and_verify_linked_domains(DID, &crypto).await.expect("should resolve");
    assert_eq!(result, LinkedDomainResult::Verified { domain_url: DOMAIN.to_string() });
}

#[tokio::test]
async fn no_service_entries_is_unverified_with_empty_domain() {
    let store = MemoryKeyStore::new();
    let crypto = CryptoRegistry::standard();
    let public = store.generate_secp256k1(format!("{DID}#sig-1")).expect("should generate");

    let resolver = StaticResolver {
        document: document_with_services(&public, vec![]),
    };
    let fetcher = StaticFetcher {
        responses: HashMap::new(),
    };

    let service = LinkedDomainsService::new(resolver, fetcher);
    let result =
        service.fetch_and_verify_linked_domains(DID, &crypto).await.expect("should resolve");
    assert_eq!(result, LinkedDomainResult::Unverified { domain_url: String::new() });
}

#[tokio::test]
async fn candidate_failure_falls_through_to_the_next_domain() {
    let store = MemoryKeyStore::new();
    let crypto = CryptoRegistry::standard();
    let public = store.generate_secp256k1(format!("{DID}#sig-1")).expect("should generate");

    let second = "https://backup.example";
    let resolver = StaticResolver {
        document: document_with_services(
            &public,
            vec![
                ServiceEndpoint::Url(DOMAIN.to_string()),
                ServiceEndpoint::Url(second.to_string()),
            ],
        ),
    };
    // The first domain is unreachable; only the second hosts a valid
    // configuration.
    let fetcher = StaticFetcher {
        responses: HashMap::from([(
            config_url(second),
            well_known_body(vec![linkage_credential(second, &store, &crypto)]),
        )]),
    };

    let service = LinkedDomainsService::new(resolver, fetcher);
    let result =
        service.fetch_and_verify_linked_domains(DID, &crypto).await.expect("should resolve");
    assert_eq!(result, LinkedDomainResult::Verified { domain_url: second.to_string() });
}

#[tokio::test]
async fn wrong_origin_is_unverified_with_first_candidate() {
    let store = MemoryKeyStore::new();
    let crypto = CryptoRegistry::standard();
    let public = store.generate_secp256k1(format!("{DID}#sig-1")).expect("should generate");

    let resolver = StaticResolver {
        document: document_with_services(
            &public,
            vec![ServiceEndpoint::Url(DOMAIN.to_string())],
        ),
    };
    // The hosted credential binds a different origin.
    let fetcher = StaticFetcher {
        responses: HashMap::from([(
            config_url(DOMAIN),
            well_known_body(vec![linkage_credential("https://other.example", &store, &crypto)]),
        )]),
    };

    let service = LinkedDomainsService::new(resolver, fetcher);
    let result =
        service.fetch_and_verify_linked_domains(DID, &crypto).await.expect("should resolve");
    assert_eq!(result, LinkedDomainResult::Unverified { domain_url: DOMAIN.to_string() });
}

#[tokio::test]
async fn foreign_signature_is_unverified() {
    let store = MemoryKeyStore::new();
    let crypto = CryptoRegistry::standard();
    let public = store.generate_secp256k1(format!("{DID}#sig-1")).expect("should generate");

    // Credential signed by a key the DID document does not contain.
    let mallory = MemoryKeyStore::new();
    mallory.generate_secp256k1(format!("{DID}#sig-1")).expect("should generate");

    let resolver = StaticResolver {
        document: document_with_services(
            &public,
            vec![ServiceEndpoint::Url(DOMAIN.to_string())],
        ),
    };
    let fetcher = StaticFetcher {
        responses: HashMap::from([(
            config_url(DOMAIN),
            well_known_body(vec![linkage_credential(DOMAIN, &mallory, &crypto)]),
        )]),
    };

    let service = LinkedDomainsService::new(resolver, fetcher);
    let result =
        service.fetch_and_verify_linked_domains(DID, &crypto).await.expect("should resolve");
    assert_eq!(result, LinkedDomainResult::Unverified { domain_url: DOMAIN.to_string() });
}
