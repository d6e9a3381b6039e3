//! Caller-owned EC keys and the key forms each backend consumes.
//!
//! A [`Key`] stores its material in one neutral form: the SEC1 uncompressed
//! public point and, for signing keys, the big-endian secret scalar padded to
//! the curve width. Backends derive what they need from that: RustCrypto key
//! objects for the native and software backends, a [`Jwk`] for WebCrypto.

use crate::{curve::Curve, error::Error};
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use serde::{Deserialize, Serialize};
use std::fmt;
use zeroize::Zeroizing;

/// An EC key on one of the NIST curves.
///
/// Keys are read-only inputs: no operation in this crate mutates or retains
/// them.
#[derive(Clone)]
pub struct Key {
    curve: Curve,
    secret: Option<Zeroizing<Vec<u8>>>,
    public: Vec<u8>,
}

impl Key {
    /// Generate a fresh signing key.
    #[must_use]
    pub fn generate(curve: Curve) -> Self {
        let mut rng = rand::thread_rng();
        let (secret, public) = match curve {
            Curve::P256 => {
                let sk = p256::ecdsa::SigningKey::random(&mut rng);
                let public = sk.verifying_key().to_encoded_point(false);
                (sk.to_bytes().to_vec(), public.as_bytes().to_vec())
            }
            Curve::P384 => {
                let sk = p384::ecdsa::SigningKey::random(&mut rng);
                let public = sk.verifying_key().to_encoded_point(false);
                (sk.to_bytes().to_vec(), public.as_bytes().to_vec())
            }
            Curve::P521 => {
                let sk = p521::ecdsa::SigningKey::random(&mut rng);
                let public = p521::ecdsa::VerifyingKey::from(&sk).to_encoded_point(false);
                (sk.to_bytes().to_vec(), public.as_bytes().to_vec())
            }
        };

        Key {
            curve,
            secret: Some(Zeroizing::new(secret)),
            public,
        }
    }

    /// Build a signing key from a big-endian secret scalar.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidKey`] if the scalar is zero or out of range.
    pub fn from_secret_bytes(curve: Curve, secret: &[u8]) -> Result<Self, Error> {
        let (secret, public) = match curve {
            Curve::P256 => {
                let sk = p256::ecdsa::SigningKey::from_slice(secret).map_err(invalid_key)?;
                let public = sk.verifying_key().to_encoded_point(false);
                (sk.to_bytes().to_vec(), public.as_bytes().to_vec())
            }
            Curve::P384 => {
                let sk = p384::ecdsa::SigningKey::from_slice(secret).map_err(invalid_key)?;
                let public = sk.verifying_key().to_encoded_point(false);
                (sk.to_bytes().to_vec(), public.as_bytes().to_vec())
            }
            Curve::P521 => {
                let sk = p521::ecdsa::SigningKey::from_slice(secret).map_err(invalid_key)?;
                let public = p521::ecdsa::VerifyingKey::from(&sk).to_encoded_point(false);
                (sk.to_bytes().to_vec(), public.as_bytes().to_vec())
            }
        };

        Ok(Key {
            curve,
            secret: Some(Zeroizing::new(secret)),
            public,
        })
    }

    /// Build a verification-only key from a SEC1 encoded point (compressed or
    /// uncompressed).
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidKey`] if the point is not on the curve.
    pub fn from_public_sec1(curve: Curve, sec1: &[u8]) -> Result<Self, Error> {
        let public = match curve {
            Curve::P256 => p256::ecdsa::VerifyingKey::from_sec1_bytes(sec1)
                .map_err(invalid_key)?
                .to_encoded_point(false)
                .as_bytes()
                .to_vec(),
            Curve::P384 => p384::ecdsa::VerifyingKey::from_sec1_bytes(sec1)
                .map_err(invalid_key)?
                .to_encoded_point(false)
                .as_bytes()
                .to_vec(),
            Curve::P521 => p521::ecdsa::VerifyingKey::from_sec1_bytes(sec1)
                .map_err(invalid_key)?
                .to_encoded_point(false)
                .as_bytes()
                .to_vec(),
        };

        Ok(Key {
            curve,
            secret: None,
            public,
        })
    }

    /// Build a key from a JWK (`kty: "EC"`).
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidKey`] for a non-EC JWK, bad base64url, wrong
    /// coordinate lengths, or a `d` that does not match `x`/`y`.
    pub fn from_jwk(jwk: &Jwk) -> Result<Self, Error> {
        if jwk.kty != "EC" {
            return Err(Error::InvalidKey(format!("unsupported kty {}", jwk.kty)));
        }

        let width = jwk.crv.width();
        let x = decode_coordinate(&jwk.x, width)?;
        let y = decode_coordinate(&jwk.y, width)?;

        let mut sec1 = Vec::with_capacity(1 + 2 * width);
        sec1.push(0x04);
        sec1.extend_from_slice(&x);
        sec1.extend_from_slice(&y);

        match &jwk.d {
            None => Key::from_public_sec1(jwk.crv, &sec1),
            Some(d) => {
                let d = Zeroizing::new(decode_coordinate(d, width)?);
                let key = Key::from_secret_bytes(jwk.crv, &d)?;
                if key.public != sec1 {
                    return Err(Error::InvalidKey("d does not match x and y".into()));
                }
                Ok(key)
            }
        }
    }

    /// The key's curve.
    #[must_use]
    pub const fn curve(&self) -> Curve {
        self.curve
    }

    /// SEC1 uncompressed public point, `0x04 ‖ x ‖ y`.
    #[must_use]
    pub fn public_sec1(&self) -> &[u8] {
        &self.public
    }

    /// Affine `x` coordinate, `width` bytes.
    #[must_use]
    pub fn x(&self) -> &[u8] {
        &self.public[1..=self.curve.width()]
    }

    /// Affine `y` coordinate, `width` bytes.
    #[must_use]
    pub fn y(&self) -> &[u8] {
        &self.public[1 + self.curve.width()..]
    }

    /// Secret scalar, if this is a signing key.
    #[must_use]
    pub fn secret(&self) -> Option<&[u8]> {
        self.secret.as_deref().map(Vec::as_slice)
    }

    /// Whether the key can sign.
    #[must_use]
    pub const fn is_signing_key(&self) -> bool {
        self.secret.is_some()
    }

    /// The verification-only half of this key.
    #[must_use]
    pub fn to_public(&self) -> Self {
        Key {
            curve: self.curve,
            secret: None,
            public: self.public.clone(),
        }
    }

    /// Export as a JWK, including `d` for signing keys.
    #[must_use]
    pub fn to_jwk(&self) -> Jwk {
        Jwk {
            kty: "EC".to_string(),
            crv: self.curve,
            x: URL_SAFE_NO_PAD.encode(self.x()),
            y: URL_SAFE_NO_PAD.encode(self.y()),
            d: self.secret().map(|d| URL_SAFE_NO_PAD.encode(d)),
        }
    }

    /// RustCrypto signing key for this key's curve.
    pub(crate) fn signing_key(&self) -> Result<SigningKey, Error> {
        let secret = self.secret().ok_or(Error::MissingSecretKey)?;
        Ok(match self.curve {
            Curve::P256 => {
                SigningKey::P256(p256::ecdsa::SigningKey::from_slice(secret).map_err(invalid_key)?)
            }
            Curve::P384 => {
                SigningKey::P384(p384::ecdsa::SigningKey::from_slice(secret).map_err(invalid_key)?)
            }
            Curve::P521 => {
                SigningKey::P521(p521::ecdsa::SigningKey::from_slice(secret).map_err(invalid_key)?)
            }
        })
    }

    /// RustCrypto verifying key for this key's curve.
    pub(crate) fn verifying_key(&self) -> Result<VerifyingKey, Error> {
        Ok(match self.curve {
            Curve::P256 => VerifyingKey::P256(
                p256::ecdsa::VerifyingKey::from_sec1_bytes(&self.public).map_err(invalid_key)?,
            ),
            Curve::P384 => VerifyingKey::P384(
                p384::ecdsa::VerifyingKey::from_sec1_bytes(&self.public).map_err(invalid_key)?,
            ),
            Curve::P521 => VerifyingKey::P521(
                p521::ecdsa::VerifyingKey::from_sec1_bytes(&self.public).map_err(invalid_key)?,
            ),
        })
    }
}

impl fmt::Debug for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Key")
            .field("curve", &self.curve)
            .field("public", &self.public)
            .field("secret", &self.secret.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

impl PartialEq for Key {
    fn eq(&self, other: &Self) -> bool {
        self.curve == other.curve && self.public == other.public && self.secret == other.secret
    }
}

impl Eq for Key {}

/// JSON Web Key for an EC key (RFC 7518 §6.2).
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Jwk {
    /// Key type, always `EC`.
    pub kty: String,

    /// Curve name.
    pub crv: Curve,

    /// base64url `x` coordinate.
    pub x: String,

    /// base64url `y` coordinate.
    pub y: String,

    /// base64url secret scalar.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub d: Option<String>,
}

impl fmt::Debug for Jwk {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Jwk")
            .field("kty", &self.kty)
            .field("crv", &self.crv)
            .field("x", &self.x)
            .field("y", &self.y)
            .field("d", &self.d.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// RustCrypto signing key, one variant per curve.
pub(crate) enum SigningKey {
    P256(p256::ecdsa::SigningKey),
    P384(p384::ecdsa::SigningKey),
    P521(p521::ecdsa::SigningKey),
}

/// RustCrypto verifying key, one variant per curve.
pub(crate) enum VerifyingKey {
    P256(p256::ecdsa::VerifyingKey),
    P384(p384::ecdsa::VerifyingKey),
    P521(p521::ecdsa::VerifyingKey),
}

fn invalid_key(e: impl fmt::Display) -> Error {
    Error::InvalidKey(e.to_string())
}

fn decode_coordinate(encoded: &str, width: usize) -> Result<Vec<u8>, Error> {
    let bytes = URL_SAFE_NO_PAD.decode(encoded).map_err(invalid_key)?;
    if bytes.len() != width {
        return Err(Error::InvalidKey(format!(
            "expected {width}-byte coordinate, got {}",
            bytes.len()
        )));
    }
    Ok(bytes)
}
