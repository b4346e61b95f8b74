//! # Base64url
//!
//! Unpadded url-safe base64 as used throughout JOSE. Encoding is strict
//! (never emits `+`, `/` or `=`); decoding tolerates trailing padding so that
//! input from lenient peers round-trips.

use base64ct::{Base64UrlUnpadded, Encoding};

use crate::error::{Error, Result};

/// Encode bytes as unpadded base64url text.
#[must_use]
pub fn encode(bytes: &[u8]) -> String {
    Base64UrlUnpadded::encode_string(bytes)
}

/// Decode base64url text, with or without trailing padding.
///
/// # Errors
///
/// Returns [`Error::Encoding`] if the input contains characters outside the
/// base64url alphabet.
pub fn decode(text: &str) -> Result<Vec<u8>> {
    let unpadded = text.trim_end_matches('=');
    Base64UrlUnpadded::decode_vec(unpadded).map_err(|_| Error::Encoding)
}
