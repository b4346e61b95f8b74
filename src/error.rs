//! # Errors
//!
//! Typed failures returned by the crate. All of these are recoverable values
//! for the immediate caller; none is process-fatal and the crate performs no
//! retries of its own. Callers integrating authentication must treat any
//! error from [`crate::validator::authenticate`] as "not authenticated".

use thiserror::Error;

use crate::crypto::Scope;

/// Result type for this crate.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Failures arising from token, key and crypto operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Input contained characters outside the base64url alphabet.
    #[error("malformed base64url input")]
    Encoding,

    /// Key material was malformed or missing fields required by its type.
    #[error("malformed key material: {0}")]
    KeyFormat(String),

    /// Neither the protected header nor the key declared an algorithm.
    #[error("no algorithm defined for key {0}")]
    KeyAlgorithmMissing(String),

    /// No provider is registered for the requested algorithm and scope.
    #[error("no {scope} provider registered for algorithm {alg}")]
    AlgorithmNotSupported {
        /// The requested algorithm name.
        alg: String,
        /// The requested access scope.
        scope: Scope,
    },

    /// Wire text could not be parsed as any JWS serialization.
    #[error("unable to parse JWS token: {0}")]
    TokenFormat(String),

    /// The requested serialization format cannot represent the token's
    /// signature count.
    #[error("{0}")]
    SignatureCount(String),

    /// Signature verification could not be performed.
    #[error("signature verification failed: {0}")]
    Signature(String),

    /// Pairwise keys can only be derived on the secp256k1 (K-256) curve.
    #[error("curve {0} is not supported for pairwise keys")]
    PairwiseKeyUnsupportedCurve(String),

    /// Pairwise key derivation failed.
    #[error("pairwise key derivation failed: {0}")]
    PairwiseKey(String),

    /// The referenced key is not held by the key store.
    #[error("key not found: {0}")]
    KeyNotFound(String),

    /// Input failed structural validation.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// JSON (de)serialization failure.
    #[error(transparent)]
    Serialization(#[from] serde_json::Error),

    /// DID resolution failure.
    #[error(transparent)]
    Resolution(#[from] ResolutionError),
}

/// Failures reported by a [`crate::did::Resolver`] or [`crate::did::HttpFetch`]
/// implementation. The kinds are distinct because callers' retry/abort policy
/// differs per kind.
#[derive(Error, Debug)]
pub enum ResolutionError {
    /// The DID (or document) does not exist.
    #[error("DID not found")]
    NotFound,

    /// The transport failed before a document could be retrieved.
    #[error("transport failure: {0}")]
    Transport(String),

    /// A document was retrieved but could not be parsed.
    #[error("malformed DID document: {0}")]
    MalformedDocument(String),

    /// The caller cancelled the resolution. Non-retryable: no partial or
    /// cached result is substituted.
    #[error("resolution cancelled")]
    Cancelled,
}

/// Failures from the authentication pipeline.
#[derive(Error, Debug)]
pub enum AuthError {
    /// The token's claims carry no issuer DID.
    #[error("request contains no issuer DID")]
    MissingIssuer,

    /// The request or token could not be parsed.
    #[error("malformed request")]
    InvalidRequest(#[source] Error),

    /// The issuer DID could not be resolved.
    #[error("unable to resolve issuer DID")]
    Resolution(#[from] ResolutionError),

    /// No valid signature from the issuer was found.
    #[error("no valid issuer signature")]
    SignatureInvalid(#[source] Error),
}
