//! # Services
//!
//! Services express ways of communicating with the DID subject or associated
//! entities. This crate cares chiefly about `LinkedDomains` entries, which
//! name web origins the subject claims to control.

use serde::{Deserialize, Serialize};

use crate::core::OneMany;

/// Service type tag for linked-domain entries.
pub const LINKED_DOMAINS: &str = "LinkedDomains";

/// A service advertised by a DID document.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Service {
    /// Identifier for the service, unique within the document.
    pub id: String,

    /// The type of service.
    #[serde(rename = "type")]
    pub type_: String,

    /// One or more endpoints for the service.
    pub service_endpoint: OneMany<ServiceEndpoint>,
}

impl Service {
    /// All endpoint URLs carried by this service, in document order.
    #[must_use]
    pub fn endpoint_urls(&self) -> Vec<String> {
        let mut urls = Vec::new();
        for endpoint in &self.service_endpoint {
            match endpoint {
                ServiceEndpoint::Url(url) => urls.push(url.clone()),
                ServiceEndpoint::Origins { origins } => urls.extend(origins.iter().cloned()),
            }
        }
        urls
    }
}

/// A service endpoint is either a bare URL or an origins object.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum ServiceEndpoint {
    /// Location of the service endpoint.
    Url(String),

    /// A set of web origins.
    Origins {
        /// Origin URLs, in declared order.
        origins: Vec<String>,
    },
}

impl Default for ServiceEndpoint {
    fn default() -> Self {
        Self::Url(String::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserialize_url_endpoint() {
        let input = r##"{
            "id": "#linkeddomains",
            "type": "LinkedDomains",
            "serviceEndpoint": "https://issuer.example"
        }"##;
        let service: Service = serde_json::from_str(input).expect("should deserialize");
        assert_eq!(service.type_, LINKED_DOMAINS);
        assert_eq!(service.endpoint_urls(), vec!["https://issuer.example"]);
    }

    #[test]
    fn deserialize_origins_endpoint() {
        let input = r##"{
            "id": "#linkeddomains",
            "type": "LinkedDomains",
            "serviceEndpoint": { "origins": ["https://a.example", "https://b.example"] }
        }"##;
        let service: Service = serde_json::from_str(input).expect("should deserialize");
        assert_eq!(service.endpoint_urls(), vec!["https://a.example", "https://b.example"]);
    }

    #[test]
    fn serialize_url_endpoint() {
        let service = Service {
            id: "#linkeddomains".to_string(),
            type_: LINKED_DOMAINS.to_string(),
            service_endpoint: OneMany::One(ServiceEndpoint::Url(
                "https://issuer.example".to_string(),
            )),
        };
        assert_eq!(
            serde_json::to_string(&service).expect("should serialize"),
            r##"{"id":"#linkeddomains","type":"LinkedDomains","serviceEndpoint":"https://issuer.example"}"##
        );
    }
}
