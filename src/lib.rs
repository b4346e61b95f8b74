//! # DID Auth
//!
//! DID-keyed authentication for OpenID-style credential exchanges. Untrusted
//! parties exchange signed JSON objects whose authenticity rests on a JOSE
//! signature layer keyed by Decentralized Identifiers resolved to public-key
//! documents.
//!
//! The receive path: signed text → [`JwsToken::deserialize`] → issuer DID
//! from the claims → [`did::Resolver`] → candidate keys from the resolved
//! document → [`JwsToken::verify`]. The send path: optional
//! [`crypto::pairwise`] derivation → a signing key in the [`keystore`] →
//! [`JwsToken::sign`] → serialize.
//!
//! Crypto is fully synchronous; asynchrony is confined to the resolver and
//! HTTP-fetch boundary.

pub mod core;
pub mod crypto;
pub mod did;
pub mod error;
pub mod jose;
pub mod keystore;
pub mod linked_domains;
pub mod oidc;
pub mod validator;

pub use crate::crypto::{CryptoRegistry, Scope, SubtleCrypto};
pub use crate::did::{Document, HttpFetch, Resolver};
pub use crate::error::{AuthError, Error, ResolutionError, Result};
pub use crate::jose::jwk::{Jwk, KeyOperation, PrivateKey, PublicKey};
pub use crate::jose::jws::{JwsFormat, JwsToken};
pub use crate::keystore::{KeyStore, MemoryKeyStore};
pub use crate::linked_domains::{LinkedDomainResult, LinkedDomainsService};
pub use crate::validator::{authenticate, Authenticated};
