//! # DID Resolution
//!
//! The resolution contract consumed by the verification pipeline, plus thin
//! HTTP implementations for deployments that resolve against a universal
//! resolver endpoint. Resolution must be idempotent (repeated calls for the
//! same DID return an equivalent document absent an on-ledger update) and
//! report failures as typed kinds, because callers' retry/abort policy
//! differs per kind. Cancellation surfaces as
//! [`ResolutionError::Cancelled`], distinct from not-found and transport
//! failures, and aborts the current attempt without substituting a partial
//! result.

use serde::Deserialize;

use crate::did::document::Document;
use crate::error::ResolutionError;

/// Resolves a DID to its document.
#[allow(async_fn_in_trait)]
pub trait Resolver: Send + Sync {
    /// Resolve a DID to a DID document.
    ///
    /// # Errors
    ///
    /// Returns a [`ResolutionError`] distinguishing not-found, transport
    /// failure, malformed document and cancellation.
    async fn resolve(&self, did: &str) -> Result<Document, ResolutionError>;
}

/// Fetches a URL, returning the response body. Used for well-known
/// configuration documents and `request_uri` dereferencing.
#[allow(async_fn_in_trait)]
pub trait HttpFetch: Send + Sync {
    /// Fetch the URL.
    ///
    /// # Errors
    ///
    /// Returns a [`ResolutionError`] describing the failure.
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, ResolutionError>;
}

/// Wire envelope returned by resolution endpoints that wrap the document in
/// resolution metadata.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ResolutionResponse {
    did_document: Document,
}

/// A [`Resolver`] backed by an HTTP resolution endpoint (for example a
/// universal resolver's `/identifiers` route).
#[derive(Clone)]
pub struct HttpResolver {
    endpoint: String,
    client: reqwest::Client,
}

impl HttpResolver {
    /// Create a resolver for the given endpoint. The DID is appended as a
    /// path segment on each request.
    #[must_use]
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            client: reqwest::Client::new(),
        }
    }
}

impl Resolver for HttpResolver {
    async fn resolve(&self, did: &str) -> Result<Document, ResolutionError> {
        let url = format!("{}/{did}", self.endpoint.trim_end_matches('/'));
        if url::Url::parse(&url).is_err() {
            return Err(ResolutionError::MalformedDocument(format!("invalid URL {url}")));
        }

        tracing::debug!("resolving {did}");
        let response = self.client.get(&url).send().await.map_err(transport)?;
        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(ResolutionError::NotFound);
        }
        if !response.status().is_success() {
            tracing::error!("resolution request for {did} returned {}", response.status());
            return Err(ResolutionError::Transport(response.status().to_string()));
        }

        let body = response.bytes().await.map_err(transport)?;
        let document = parse_document(&body)?;
        if document.id.is_empty() {
            return Err(ResolutionError::MalformedDocument("document has no id".to_string()));
        }
        Ok(document)
    }
}

impl HttpFetch for HttpResolver {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, ResolutionError> {
        self.client.fetch_url(url).await
    }
}

/// A plain [`HttpFetch`] over a reqwest client.
#[derive(Clone, Default)]
pub struct HttpClient {
    client: reqwest::Client,
}

impl HttpClient {
    /// Create a client with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl HttpFetch for HttpClient {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, ResolutionError> {
        self.client.fetch_url(url).await
    }
}

/// Shared fetch-with-status-mapping over a reqwest client.
trait FetchUrl {
    async fn fetch_url(&self, url: &str) -> Result<Vec<u8>, ResolutionError>;
}

impl FetchUrl for reqwest::Client {
    async fn fetch_url(&self, url: &str) -> Result<Vec<u8>, ResolutionError> {
        tracing::trace!("fetching {url}");
        let response = self.get(url).send().await.map_err(transport)?;
        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(ResolutionError::NotFound);
        }
        if !response.status().is_success() {
            return Err(ResolutionError::Transport(response.status().to_string()));
        }
        Ok(response.bytes().await.map_err(transport)?.to_vec())
    }
}

fn parse_document(body: &[u8]) -> Result<Document, ResolutionError> {
    // Accept a bare document or a resolution envelope.
    if let Ok(envelope) = serde_json::from_slice::<ResolutionResponse>(body) {
        return Ok(envelope.did_document);
    }
    serde_json::from_slice(body).map_err(|e| ResolutionError::MalformedDocument(e.to_string()))
}

fn transport(e: reqwest::Error) -> ResolutionError {
    ResolutionError::Transport(e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_bare_and_enveloped_documents() {
        let bare = br#"{"id":"did:example:123"}"#;
        assert_eq!(parse_document(bare).expect("should parse").id, "did:example:123");

        let enveloped = br#"{
            "@context": "https://www.w3.org/ns/did-resolution/v1",
            "didDocument": {"id": "did:example:123"},
            "resolverMetadata": {"driverId": "did:ion"}
        }"#;
        assert_eq!(parse_document(enveloped).expect("should parse").id, "did:example:123");

        let garbage = br"not json";
        assert!(matches!(
            parse_document(garbage),
            Err(ResolutionError::MalformedDocument(_))
        ));
    }
}
