//! # JSON Object Signing and Encryption (JOSE)
//!
//! JWS [RFC7515] tokens and JWK [RFC7517] key material. Signing and
//! verification are keyed by DID-resolved public keys; see [`crate::did`] for
//! resolution and [`crate::crypto`] for the algorithm providers.
//!
//! [RFC7515]: https://www.rfc-editor.org/rfc/rfc7515
//! [RFC7517]: https://www.rfc-editor.org/rfc/rfc7517

pub mod b64;
pub mod jwk;
pub mod jws;

/// The `alg` JOSE header parameter.
pub const HEADER_ALG: &str = "alg";

/// The `kid` JOSE header parameter.
pub const HEADER_KID: &str = "kid";

/// The `typ` JOSE header parameter.
pub const HEADER_TYP: &str = "typ";

/// ECDSA over secp256k1 with SHA-256.
pub const ES256K: &str = "ES256K";

/// HMAC with SHA-256.
pub const HS256: &str = "HS256";

/// Pre-encoded protected header for an unsigned compact token:
/// `base64url({"alg":"none","typ":"JWT"})`.
pub(crate) const UNSIGNED_PROTECTED: &str = "eyJhbGciOiJub25lIiwidHlwIjoiSldUIn0";
