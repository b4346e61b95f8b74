//! # OpenID Connect Objects
//!
//! Self-issued OIDC (SIOP) request and response value objects. These are
//! immutable once constructed, one per protocol exchange, and carry a
//! reference back to the JWS token that authenticated them.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use url::Url;

use crate::crypto::CryptoRegistry;
use crate::did::{HttpFetch, Resolver};
use crate::error::{AuthError, Error, Result};
use crate::jose::jws::{JwsFormat, JwsToken};
use crate::keystore::KeyStore;
use crate::validator;

/// Standard response type for SIOP.
pub const DEFAULT_RESPONSE_TYPE: &str = "id_token";

/// Standard response mode for SIOP.
pub const DEFAULT_RESPONSE_MODE: &str = "form_post";

/// Standard scope for SIOP.
pub const DEFAULT_SCOPE: &str = "openid did_authn";

/// Issuer value of a self-issued response.
pub const SELF_ISSUED: &str = "https://self-issued.me";

/// URI scheme carrying signed requests.
const OPENID_SCHEME: &str = "openid";

/// Claims of a signed OIDC request.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct RequestContent {
    /// The requesting party's DID.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub iss: Option<String>,

    /// Intended audience of the request.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub aud: Option<String>,

    /// Expected response type.
    #[serde(rename = "response_type", skip_serializing_if = "Option::is_none")]
    pub response_type: Option<String>,

    /// Expected response mode.
    #[serde(rename = "response_mode", skip_serializing_if = "Option::is_none")]
    pub response_mode: Option<String>,

    /// Relying-party client identifier; doubles as the response target.
    #[serde(rename = "client_id", skip_serializing_if = "Option::is_none")]
    pub client_id: Option<String>,

    /// Response target when `client_id` is absent.
    #[serde(rename = "redirect_uri", skip_serializing_if = "Option::is_none")]
    pub redirect_uri: Option<String>,

    /// Requested scope.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,

    /// Opaque relying-party state, echoed in the response.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,

    /// Replay-protection nonce, echoed in the response.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nonce: Option<String>,

    /// Maximum authentication age, in seconds.
    #[serde(rename = "max_age", skip_serializing_if = "Option::is_none")]
    pub max_age: Option<i64>,

    /// Claims requested by the relying party.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub claims: Option<Value>,

    /// Relying-party registration parameters.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub registration: Option<Value>,
}

impl RequestContent {
    /// The URI the response should be sent to.
    #[must_use]
    pub fn response_uri(&self) -> Option<&str> {
        self.client_id.as_deref().or(self.redirect_uri.as_deref())
    }
}

/// An authenticated OIDC request: parsed claims plus the token that carried
/// them.
#[derive(Clone, Debug)]
pub struct OidcRequest {
    /// The request claims.
    pub content: RequestContent,

    /// The verified token the claims were parsed from.
    pub token: JwsToken,
}

impl OidcRequest {
    /// Parse an `openid://` request URI, dereference `request_uri`
    /// indirection when present, and authenticate the signed request object
    /// against its issuer's resolved DID document.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::InvalidRequest`] for a URI that carries no signed
    /// request or a request missing its nonce or response target, and the
    /// pipeline's errors for resolution and signature failures.
    pub async fn parse_and_verify(
        uri: &str, resolver: &impl Resolver, fetcher: &impl HttpFetch, crypto: &CryptoRegistry,
    ) -> Result<Self, AuthError> {
        let url = Url::parse(uri)
            .map_err(|e| AuthError::InvalidRequest(Error::InvalidInput(e.to_string())))?;
        if url.scheme() != OPENID_SCHEME {
            return Err(AuthError::InvalidRequest(Error::InvalidInput(format!(
                "unsupported request scheme {}",
                url.scheme()
            ))));
        }

        let params: HashMap<String, String> = url.query_pairs().into_owned().collect();
        let signed_request = if let Some(request) = params.get("request") {
            request.clone()
        } else if let Some(request_uri) = params.get("request_uri") {
            let body = fetcher.fetch(request_uri).await?;
            String::from_utf8(body).map_err(|e| {
                AuthError::InvalidRequest(Error::InvalidInput(format!(
                    "request object is not UTF-8: {e}"
                )))
            })?
        } else {
            return Err(AuthError::InvalidRequest(Error::InvalidInput(
                "request contains no signed material".to_string(),
            )));
        };

        let authenticated = validator::authenticate(&signed_request, resolver, crypto).await?;
        let content: RequestContent = serde_json::from_value(authenticated.claims)
            .map_err(|e| AuthError::InvalidRequest(e.into()))?;

        if content.nonce.is_none() {
            return Err(AuthError::InvalidRequest(Error::InvalidInput(
                "no nonce was included in the request".to_string(),
            )));
        }
        if content.response_uri().is_none() {
            return Err(AuthError::InvalidRequest(Error::InvalidInput(
                "request names no response target".to_string(),
            )));
        }

        Ok(Self {
            content,
            token: authenticated.token,
        })
    }
}

/// Claims of a self-issued OIDC response.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct ResponseContent {
    /// Always the self-issued issuer.
    pub iss: String,

    /// The relying party the response is addressed to.
    pub aud: String,

    /// The responder's DID.
    pub did: String,

    /// Nonce echoed from the request.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nonce: Option<String>,

    /// State echoed from the request.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,

    /// Issued-at, seconds since the epoch.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub iat: Option<i64>,

    /// Expiry, seconds since the epoch.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exp: Option<i64>,
}

impl ResponseContent {
    /// Build a response to the given request, issued by `did`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] if the request names no response
    /// target.
    pub fn for_request(request: &RequestContent, did: impl Into<String>) -> Result<Self> {
        let Some(aud) = request.response_uri() else {
            return Err(Error::InvalidInput("request names no response target".to_string()));
        };
        Ok(Self {
            iss: SELF_ISSUED.to_string(),
            aud: aud.to_string(),
            did: did.into(),
            nonce: request.nonce.clone(),
            state: request.state.clone(),
            iat: None,
            exp: None,
        })
    }

    /// Stamp the response with an issue time of now and the given lifetime.
    #[must_use]
    pub fn expires_in(mut self, seconds: i64) -> Self {
        let now = chrono::Utc::now().timestamp();
        self.iat = Some(now);
        self.exp = Some(now + seconds);
        self
    }

    /// Sign the response with the referenced key and serialize it compactly
    /// for transmission.
    ///
    /// # Errors
    ///
    /// Returns the signing errors of [`JwsToken::sign`].
    pub fn into_signed(
        self, key_ref: &str, keystore: &dyn KeyStore, crypto: &CryptoRegistry,
    ) -> Result<String> {
        let mut token = JwsToken::new(&serde_json::to_vec(&self)?);
        token.sign(key_ref, keystore, crypto, &HashMap::new())?;
        token.serialize(JwsFormat::Compact)
    }
}
