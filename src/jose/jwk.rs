//! # JSON Web Keys
//!
//! The crate's key model: a minimal JWK [RFC7517] wire representation and the
//! closed public/private key unions built from it. Each key family is tagged
//! by its `kty` and decoded by explicit dispatch.
//!
//! [RFC7517]: https://www.rfc-editor.org/rfc/rfc7517

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Key type tag for elliptic-curve keys.
pub const KTY_EC: &str = "EC";

/// Key type tag for RSA keys.
pub const KTY_RSA: &str = "RSA";

/// Key type tag for octet (symmetric) keys.
pub const KTY_OCT: &str = "oct";

/// A JSON Web Key. Only fields relevant to the key's `kty` are populated.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct Jwk {
    /// Key identifier, unique within its containing document.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kid: Option<String>,

    /// Key type.
    pub kty: String,

    /// Cryptographic curve for an elliptic-curve key.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub crv: Option<String>,

    /// X coordinate of an elliptic-curve point, base64url-encoded.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub x: Option<String>,

    /// Y coordinate of an elliptic-curve point, base64url-encoded.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub y: Option<String>,

    /// Private key scalar or exponent, base64url-encoded.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub d: Option<String>,

    /// RSA modulus, base64url-encoded.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub n: Option<String>,

    /// RSA public exponent, base64url-encoded.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub e: Option<String>,

    /// Symmetric key value, base64url-encoded.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub k: Option<String>,

    /// Declared algorithm for use with this key.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alg: Option<String>,

    /// Operations the key is allowed to perform.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key_ops: Option<Vec<KeyOperation>>,
}

/// Operations a key may be used for.
#[derive(Clone, Copy, Debug, Deserialize, Serialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum KeyOperation {
    /// Produce signatures.
    Sign,
    /// Verify signatures.
    Verify,
    /// Encrypt content.
    Encrypt,
    /// Decrypt content.
    Decrypt,
}

/// Public key material, tagged by key type.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PublicMaterial {
    /// An elliptic-curve point.
    EllipticCurve {
        /// Curve name.
        crv: String,
        /// X coordinate, base64url-encoded.
        x: String,
        /// Y coordinate, base64url-encoded.
        y: String,
    },

    /// An RSA modulus and public exponent.
    Rsa {
        /// Modulus, base64url-encoded.
        n: String,
        /// Public exponent, base64url-encoded.
        e: String,
    },
}

/// A verification-capable public key. Immutable after construction.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PublicKey {
    /// Key identifier.
    pub kid: String,

    /// Declared algorithm, if any.
    pub alg: Option<String>,

    /// Allowed operations, if declared.
    pub key_ops: Option<Vec<KeyOperation>>,

    /// The key material.
    pub material: PublicMaterial,
}

impl PublicKey {
    /// Construct from a JWK-shaped record, dispatching on `kty`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::KeyFormat`] if the key type is unrecognized or fields
    /// required by that type are missing.
    pub fn from_jwk(jwk: &Jwk) -> Result<Self> {
        let material = match jwk.kty.as_str() {
            KTY_EC => PublicMaterial::EllipticCurve {
                crv: require(jwk.crv.as_ref(), "crv")?,
                x: require(jwk.x.as_ref(), "x")?,
                y: require(jwk.y.as_ref(), "y")?,
            },
            KTY_RSA => PublicMaterial::Rsa {
                n: require(jwk.n.as_ref(), "n")?,
                e: require(jwk.e.as_ref(), "e")?,
            },
            other => {
                return Err(Error::KeyFormat(format!("unrecognized key type {other}")));
            }
        };
        Ok(Self {
            kid: jwk.kid.clone().unwrap_or_default(),
            alg: jwk.alg.clone(),
            key_ops: jwk.key_ops.clone(),
            material,
        })
    }

    /// Project the key as a JWK. Never contains secret fields.
    #[must_use]
    pub fn to_jwk(&self) -> Jwk {
        let mut jwk = Jwk {
            kid: none_if_empty(&self.kid),
            alg: self.alg.clone(),
            key_ops: self.key_ops.clone(),
            ..Jwk::default()
        };
        match &self.material {
            PublicMaterial::EllipticCurve { crv, x, y } => {
                jwk.kty = KTY_EC.to_string();
                jwk.crv = Some(crv.clone());
                jwk.x = Some(x.clone());
                jwk.y = Some(y.clone());
            }
            PublicMaterial::Rsa { n, e } => {
                jwk.kty = KTY_RSA.to_string();
                jwk.n = Some(n.clone());
                jwk.e = Some(e.clone());
            }
        }
        jwk
    }

    /// Whether this key answers to the given key ID: exact match, or the
    /// key's fully-qualified ID ends with the supplied fragment. The suffix
    /// comparison is an interop shim for fragment-only references, not a
    /// security boundary; callers match exactly first.
    #[must_use]
    pub fn matches(&self, kid: &str) -> bool {
        self.kid == kid || (!kid.is_empty() && self.kid.ends_with(kid))
    }
}

/// Private key material, tagged by key type. Holds secret fields in addition
/// to the public parameters.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PrivateMaterial {
    /// An elliptic-curve scalar and its public point.
    EllipticCurve {
        /// Curve name.
        crv: String,
        /// Public X coordinate, base64url-encoded.
        x: String,
        /// Public Y coordinate, base64url-encoded.
        y: String,
        /// Private scalar, base64url-encoded.
        d: String,
    },

    /// An RSA key pair.
    Rsa {
        /// Modulus, base64url-encoded.
        n: String,
        /// Public exponent, base64url-encoded.
        e: String,
        /// Private exponent, base64url-encoded.
        d: String,
    },

    /// A symmetric secret.
    Symmetric {
        /// Key value, base64url-encoded.
        k: String,
    },
}

/// A signing-capable private key. Immutable after construction; owned by
/// whichever component produced it and never shared mutably.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PrivateKey {
    /// Key identifier.
    pub kid: String,

    /// Declared algorithm, if any.
    pub alg: Option<String>,

    /// Allowed operations, if declared.
    pub key_ops: Option<Vec<KeyOperation>>,

    /// The key material, including secret fields.
    pub material: PrivateMaterial,
}

impl PrivateKey {
    /// Construct from a JWK-shaped record, dispatching on `kty`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::KeyFormat`] if the key type is unrecognized or fields
    /// required by that type are missing.
    pub fn from_jwk(jwk: &Jwk) -> Result<Self> {
        let material = match jwk.kty.as_str() {
            KTY_EC => PrivateMaterial::EllipticCurve {
                crv: require(jwk.crv.as_ref(), "crv")?,
                x: require(jwk.x.as_ref(), "x")?,
                y: require(jwk.y.as_ref(), "y")?,
                d: require(jwk.d.as_ref(), "d")?,
            },
            KTY_RSA => PrivateMaterial::Rsa {
                n: require(jwk.n.as_ref(), "n")?,
                e: require(jwk.e.as_ref(), "e")?,
                d: require(jwk.d.as_ref(), "d")?,
            },
            KTY_OCT => PrivateMaterial::Symmetric {
                k: require(jwk.k.as_ref(), "k")?,
            },
            other => {
                return Err(Error::KeyFormat(format!("unrecognized key type {other}")));
            }
        };
        Ok(Self {
            kid: jwk.kid.clone().unwrap_or_default(),
            alg: jwk.alg.clone(),
            key_ops: jwk.key_ops.clone(),
            material,
        })
    }

    /// Express the full key, secret fields included, as a JWK. Used to hand
    /// the key to a private-scope crypto provider; never put this on the
    /// wire.
    #[must_use]
    pub fn to_jwk(&self) -> Jwk {
        let mut jwk = Jwk {
            kid: none_if_empty(&self.kid),
            alg: self.alg.clone(),
            key_ops: self.key_ops.clone(),
            ..Jwk::default()
        };
        match &self.material {
            PrivateMaterial::EllipticCurve { crv, x, y, d } => {
                jwk.kty = KTY_EC.to_string();
                jwk.crv = Some(crv.clone());
                jwk.x = Some(x.clone());
                jwk.y = Some(y.clone());
                jwk.d = Some(d.clone());
            }
            PrivateMaterial::Rsa { n, e, d } => {
                jwk.kty = KTY_RSA.to_string();
                jwk.n = Some(n.clone());
                jwk.e = Some(e.clone());
                jwk.d = Some(d.clone());
            }
            PrivateMaterial::Symmetric { k } => {
                jwk.kty = KTY_OCT.to_string();
                jwk.k = Some(k.clone());
            }
        }
        jwk
    }

    /// The public half of this key pair, or `None` for symmetric keys.
    #[must_use]
    pub fn public_key(&self) -> Option<PublicKey> {
        let material = match &self.material {
            PrivateMaterial::EllipticCurve { crv, x, y, .. } => PublicMaterial::EllipticCurve {
                crv: crv.clone(),
                x: x.clone(),
                y: y.clone(),
            },
            PrivateMaterial::Rsa { n, e, .. } => PublicMaterial::Rsa {
                n: n.clone(),
                e: e.clone(),
            },
            PrivateMaterial::Symmetric { .. } => return None,
        };
        Some(PublicKey {
            kid: self.kid.clone(),
            alg: self.alg.clone(),
            key_ops: self.key_ops.clone(),
            material,
        })
    }

    /// The key's public projection as a JWK. Never contains `d` or `k`.
    #[must_use]
    pub fn public_jwk(&self) -> Jwk {
        self.public_key().map_or_else(
            || Jwk {
                kid: none_if_empty(&self.kid),
                kty: KTY_OCT.to_string(),
                alg: self.alg.clone(),
                key_ops: self.key_ops.clone(),
                ..Jwk::default()
            },
            |public| public.to_jwk(),
        )
    }
}

fn require(field: Option<&String>, name: &str) -> Result<String> {
    field.cloned().ok_or_else(|| Error::KeyFormat(format!("missing required field {name}")))
}

fn none_if_empty(kid: &str) -> Option<String> {
    if kid.is_empty() { None } else { Some(kid.to_string()) }
}
