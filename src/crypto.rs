//! # Crypto Providers
//!
//! A capability table mapping `(algorithm, scope)` to a signer/verifier
//! implementation. The table is built once at startup and passed by reference
//! into every component that needs crypto operations. There is no ambient
//! global registry.
//!
//! [`Scope`] is an access-control boundary, not a namespace: a provider
//! registered under [`Scope::Private`] (operations that need secret material)
//! is never returned for a [`Scope::Public`] lookup, so code holding only a
//! public key cannot reach a private-scope signer.
//!
//! All providers are fully synchronous; asynchrony lives only at the
//! resolver/HTTP boundary in [`crate::did`].

pub mod hmac;
pub mod pairwise;
pub mod secp256k1;

use std::collections::HashMap;
use std::fmt::{self, Display};
use std::sync::Arc;

use crate::error::{Error, Result};
use crate::jose::jwk::Jwk;
use crate::jose::{ES256K, HS256};

/// Access scope for a registered provider.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Scope {
    /// Verification only. Safe to expose to code that holds public keys.
    Public,

    /// Operations requiring secret material: signing, MAC computation.
    Private,
}

impl Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Public => write!(f, "public"),
            Self::Private => write!(f, "private"),
        }
    }
}

/// Key material imported by a provider, ready for cryptographic use.
#[derive(Clone)]
pub enum CryptoKey {
    /// A secp256k1 verifying key.
    Secp256k1Public(k256::ecdsa::VerifyingKey),

    /// A secp256k1 signing key.
    Secp256k1Private(k256::ecdsa::SigningKey),

    /// A raw symmetric secret.
    Secret(Vec<u8>),
}

/// A synchronous signer/verifier for one algorithm family.
pub trait SubtleCrypto: Send + Sync {
    /// Import a JWK into provider-native key material.
    ///
    /// # Errors
    ///
    /// Returns [`Error::KeyFormat`] if the JWK does not carry the fields the
    /// provider's algorithm requires.
    fn import_key(&self, jwk: &Jwk) -> Result<CryptoKey>;

    /// Sign data, returning raw signature bytes.
    ///
    /// # Errors
    ///
    /// Returns an error if the key lacks signing material.
    fn sign(&self, key: &CryptoKey, data: &[u8]) -> Result<Vec<u8>>;

    /// Verify a raw signature over data. `Ok(false)` is a cryptographic
    /// mismatch; `Err` is a structural failure.
    ///
    /// # Errors
    ///
    /// Returns an error if the key or signature is structurally unusable.
    fn verify(&self, key: &CryptoKey, signature: &[u8], data: &[u8]) -> Result<bool>;
}

/// Capability table from `(algorithm, scope)` to provider.
#[derive(Clone, Default)]
pub struct CryptoRegistry {
    providers: HashMap<(String, Scope), Arc<dyn SubtleCrypto>>,
}

impl CryptoRegistry {
    /// An empty registry with no capabilities.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            providers: HashMap::new(),
        }
    }

    /// The standard registry: ES256K at both scopes and HS256 at private
    /// scope only.
    #[must_use]
    pub fn standard() -> Self {
        let secp = Arc::new(secp256k1::Secp256k1Provider);
        Self::empty()
            .with_provider(ES256K, Scope::Public, secp.clone())
            .with_provider(ES256K, Scope::Private, secp)
            .with_provider(HS256, Scope::Private, Arc::new(hmac::HmacSha256Provider))
    }

    /// Register a provider for an algorithm at a scope.
    #[must_use]
    pub fn with_provider(
        mut self, alg: impl Into<String>, scope: Scope, provider: Arc<dyn SubtleCrypto>,
    ) -> Self {
        self.providers.insert((alg.into(), scope), provider);
        self
    }

    /// Look up a signer for the algorithm at the given scope.
    ///
    /// # Errors
    ///
    /// Returns [`Error::AlgorithmNotSupported`] if no provider is registered
    /// for the pair.
    pub fn signer(&self, alg: &str, scope: Scope) -> Result<&dyn SubtleCrypto> {
        self.provider(alg, scope)
    }

    /// Look up a verifier for the algorithm at the given scope.
    ///
    /// # Errors
    ///
    /// Returns [`Error::AlgorithmNotSupported`] if no provider is registered
    /// for the pair.
    pub fn verifier(&self, alg: &str, scope: Scope) -> Result<&dyn SubtleCrypto> {
        self.provider(alg, scope)
    }

    fn provider(&self, alg: &str, scope: Scope) -> Result<&dyn SubtleCrypto> {
        self.providers.get(&(alg.to_string(), scope)).map(|provider| provider.as_ref()).ok_or_else(
            || Error::AlgorithmNotSupported {
                alg: alg.to_string(),
                scope,
            },
        )
    }
}
