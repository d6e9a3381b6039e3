//! NIST curves used by the ECDSA JWA algorithms.

use crate::{error::Error, hash::HashName};
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

/// A NIST prime curve, named as in JWK `crv` and WebCrypto `namedCurve`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Curve {
    /// `secp256r1`
    #[serde(rename = "P-256")]
    P256,

    /// `secp384r1`
    #[serde(rename = "P-384")]
    P384,

    /// `secp521r1`
    #[serde(rename = "P-521")]
    P521,
}

impl Curve {
    /// All supported curves.
    pub const ALL: [Curve; 3] = [Curve::P256, Curve::P384, Curve::P521];

    /// The curve's standard name (`P-256`, `P-384`, `P-521`).
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Curve::P256 => "P-256",
            Curve::P384 => "P-384",
            Curve::P521 => "P-521",
        }
    }

    /// Byte length of one coordinate (and of `r` or `s`) on this curve.
    ///
    /// This is the byte-padded width of the group order, so P-521 takes
    /// 66 bytes rather than `521 / 8`.
    #[must_use]
    pub const fn width(self) -> usize {
        match self {
            Curve::P256 => 32,
            Curve::P384 => 48,
            Curve::P521 => 66,
        }
    }

    /// Length of a concatenated `r ‖ s` signature on this curve.
    #[must_use]
    pub const fn signature_len(self) -> usize {
        2 * self.width()
    }
}

impl fmt::Display for Curve {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Parses the JWK `crv` names. An unknown name is reported as
/// [`Error::InvalidKey`] since the usual input is a key's `crv` member.
impl FromStr for Curve {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Curve::ALL
            .into_iter()
            .find(|curve| curve.name() == s)
            .ok_or_else(|| Error::InvalidKey(format!("unknown curve {s}")))
    }
}

/// The curve paired with a hash in the JWA ECDSA algorithms.
#[must_use]
pub const fn curve_for(hash: HashName) -> Curve {
    match hash {
        HashName::Sha256 => Curve::P256,
        HashName::Sha384 => Curve::P384,
        HashName::Sha512 => Curve::P521,
    }
}

/// Like [`curve_for`], starting from a hash name such as `"SHA-384"`.
///
/// # Errors
///
/// Returns [`Error::UnsupportedHash`] if the name is not one of the three
/// supported hashes.
pub fn curve_for_name(hash: &str) -> Result<Curve, Error> {
    hash.parse().map(curve_for)
}

/// Coordinate width of a curve. See [`Curve::width`].
#[must_use]
pub const fn width_for(curve: Curve) -> usize {
    curve.width()
}
