//! SHA-2 hash names and the digest-by-name helper.

use crate::error::Error;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256, Sha384, Sha512};
use std::{fmt, str::FromStr};

/// A SHA-2 hash used by one of the ECDSA JWA algorithms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum HashName {
    /// SHA-256
    #[serde(rename = "SHA-256")]
    Sha256,

    /// SHA-384
    #[serde(rename = "SHA-384")]
    Sha384,

    /// SHA-512
    #[serde(rename = "SHA-512")]
    Sha512,
}

impl HashName {
    /// All supported hashes.
    pub const ALL: [HashName; 3] = [HashName::Sha256, HashName::Sha384, HashName::Sha512];

    /// WebCrypto-style name (`SHA-256`, ...).
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            HashName::Sha256 => "SHA-256",
            HashName::Sha384 => "SHA-384",
            HashName::Sha512 => "SHA-512",
        }
    }

    /// Digest name as enumerated by native crypto providers (`sha256`, ...).
    #[must_use]
    pub const fn native_name(self) -> &'static str {
        match self {
            HashName::Sha256 => "sha256",
            HashName::Sha384 => "sha384",
            HashName::Sha512 => "sha512",
        }
    }

    /// Output length in bytes.
    #[must_use]
    pub const fn output_len(self) -> usize {
        match self {
            HashName::Sha256 => 32,
            HashName::Sha384 => 48,
            HashName::Sha512 => 64,
        }
    }

    /// Derive the hash from an algorithm name: `ES384` selects `SHA-384`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnsupportedHash`] when the name has no `ES` prefix or
    /// its digits do not name a supported hash.
    pub fn for_algorithm(alg: &str) -> Result<Self, Error> {
        let bits = alg
            .strip_prefix("ES")
            .ok_or_else(|| Error::UnsupportedHash(alg.to_string()))?;
        format!("SHA-{bits}").parse()
    }
}

impl fmt::Display for HashName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for HashName {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        HashName::ALL
            .into_iter()
            .find(|hash| hash.name() == s)
            .ok_or_else(|| Error::UnsupportedHash(s.to_string()))
    }
}

/// Compute the digest of `data` with the named hash.
///
/// The hashing itself is synchronous; the future form keeps the call contract
/// identical to asynchronous digest providers.
pub async fn digest(hash: HashName, data: &[u8]) -> Vec<u8> {
    match hash {
        HashName::Sha256 => Sha256::digest(data).to_vec(),
        HashName::Sha384 => Sha384::digest(data).to_vec(),
        HashName::Sha512 => Sha512::digest(data).to_vec(),
    }
}
