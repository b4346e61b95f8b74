//! # Authentication Pipeline
//!
//! Turns received signed text into verified claims: deserialize the token,
//! read the issuer DID from its claims, resolve the issuer's document, and
//! verify the token against the document's keys. Any error from
//! [`authenticate`] means "not authenticated"; no security-relevant check
//! here can be bypassed by catching and ignoring a failure upstream.

use serde_json::Value;

use crate::crypto::CryptoRegistry;
use crate::did::{Document, Resolver};
use crate::error::{AuthError, Error};
use crate::jose::jws::JwsToken;

/// The outcome of a successful authentication.
#[derive(Clone, Debug)]
pub struct Authenticated {
    /// The token's payload claims.
    pub claims: Value,

    /// The verified token.
    pub token: JwsToken,

    /// The issuer's resolved document.
    pub document: Document,
}

/// Authenticate signed text against its issuer's DID document.
///
/// The issuer is read from the `iss` claim; its document's public keys become
/// the verification candidates; at least one valid issuer-controlled
/// signature suffices (`require_all = false`).
///
/// # Errors
///
/// Returns [`AuthError::MissingIssuer`] when the claims carry no issuer,
/// [`AuthError::Resolution`] when the issuer cannot be resolved (the
/// resolution kind, not-found, transport, malformed or cancelled, is
/// preserved), [`AuthError::SignatureInvalid`] when no signature verifies,
/// and [`AuthError::InvalidRequest`] when the text is not a parseable token.
pub async fn authenticate(
    signed_text: &str, resolver: &impl Resolver, crypto: &CryptoRegistry,
) -> Result<Authenticated, AuthError> {
    let token = JwsToken::deserialize(signed_text).map_err(AuthError::InvalidRequest)?;
    let content = token.content().map_err(AuthError::InvalidRequest)?;
    let claims: Value =
        serde_json::from_slice(&content).map_err(|e| AuthError::InvalidRequest(e.into()))?;

    let issuer = claims.get("iss").and_then(Value::as_str).unwrap_or_default();
    if issuer.is_empty() {
        return Err(AuthError::MissingIssuer);
    }

    let document = resolver.resolve(issuer).await?;
    let candidates = document.verification_keys();

    match token.verify(crypto, None, &candidates, false) {
        Ok(true) => Ok(Authenticated {
            claims,
            token,
            document,
        }),
        Ok(false) => Err(AuthError::SignatureInvalid(Error::Signature(
            "no candidate key verified any signature".to_string(),
        ))),
        Err(e) => Err(AuthError::SignatureInvalid(e)),
    }
}
