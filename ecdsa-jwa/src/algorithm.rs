//! JWA ECDSA algorithm identifiers.

use crate::{
    curve::{curve_for, Curve},
    error::Error,
    hash::HashName,
    key::Key,
};
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

/// One of the three JWA ECDSA algorithms (RFC 7518 §3.4).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum AlgorithmId {
    /// ECDSA using P-256 and SHA-256
    #[serde(rename = "ES256")]
    Es256,

    /// ECDSA using P-384 and SHA-384
    #[serde(rename = "ES384")]
    Es384,

    /// ECDSA using P-521 and SHA-512
    #[serde(rename = "ES512")]
    Es512,
}

impl AlgorithmId {
    /// All algorithms, in registry order.
    pub const ALL: [AlgorithmId; 3] = [AlgorithmId::Es256, AlgorithmId::Es384, AlgorithmId::Es512];

    /// The JOSE `alg` value.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            AlgorithmId::Es256 => "ES256",
            AlgorithmId::Es384 => "ES384",
            AlgorithmId::Es512 => "ES512",
        }
    }

    /// Resolve the `(hash, curve, width)` triple this algorithm is bound to.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnsupportedHash`] if the name does not map to a known
    /// hash. This cannot happen for the three defined variants and is treated
    /// as a configuration error by the registry.
    pub fn suite(self) -> Result<Suite, Error> {
        let hash = HashName::for_algorithm(self.name())?;
        Ok(Suite::new(hash))
    }
}

impl fmt::Display for AlgorithmId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for AlgorithmId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        AlgorithmId::ALL
            .into_iter()
            .find(|alg| alg.name() == s)
            .ok_or_else(|| Error::UnsupportedAlgorithm(s.to_string()))
    }
}

/// The `(hash, curve, width)` triple every backend adapter is bound to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Suite {
    /// Message digest.
    pub hash: HashName,

    /// Curve the key must be on.
    pub curve: Curve,

    /// Coordinate width in bytes.
    pub width: usize,
}

impl Suite {
    /// Build the suite for a hash via the fixed hash-to-curve table.
    #[must_use]
    pub const fn new(hash: HashName) -> Self {
        let curve = curve_for(hash);
        Suite {
            hash,
            curve,
            width: curve.width(),
        }
    }

    /// Fail fast if `curve` is not the suite's curve.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidCurve`] on mismatch.
    pub fn check_curve(&self, curve: Curve) -> Result<(), Error> {
        if curve == self.curve {
            Ok(())
        } else {
            Err(Error::InvalidCurve {
                expected: self.curve,
                actual: curve,
            })
        }
    }

    /// Preconditions for signing: right curve, and a secret scalar present.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidCurve`] or [`Error::MissingSecretKey`].
    pub fn check_signer(&self, key: &Key) -> Result<(), Error> {
        self.check_curve(key.curve())?;
        if key.is_signing_key() {
            Ok(())
        } else {
            Err(Error::MissingSecretKey)
        }
    }

    /// Preconditions for verifying: right curve, and a mac of `2 * width`
    /// bytes.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidCurve`] or [`Error::MalformedSignature`].
    pub fn check_verifier(&self, key: &Key, mac: &[u8]) -> Result<(), Error> {
        self.check_curve(key.curve())?;
        self.check_mac(mac)
    }

    /// Fail fast if a concatenated signature has the wrong length.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MalformedSignature`] unless `mac.len() == 2 * width`.
    pub fn check_mac(&self, mac: &[u8]) -> Result<(), Error> {
        if mac.len() == 2 * self.width {
            Ok(())
        } else {
            Err(Error::MalformedSignature("concatenated signature has wrong length"))
        }
    }
}
