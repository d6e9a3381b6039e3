//! Error types for signing and verification operations.

use crate::{backend::BackendKind, curve::Curve};

/// Errors surfaced by the algorithm registry, the backends, and the
/// signature codec.
///
/// Nothing in this crate retries on any of these; retry policy belongs to the
/// caller.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// The hash named by an algorithm is not one of SHA-256, SHA-384, SHA-512.
    #[error("unsupported hash: {0}")]
    UnsupportedHash(String),

    /// The name is not one of `ES256`, `ES384`, `ES512`.
    #[error("unsupported algorithm: {0}")]
    UnsupportedAlgorithm(String),

    /// The key's curve does not match the curve required by the algorithm.
    #[error("invalid curve: expected {expected}, got {actual}")]
    InvalidCurve {
        /// Curve required by the algorithm.
        expected: Curve,

        /// Curve carried by the key.
        actual: Curve,
    },

    /// A signature (concatenated or DER) violated its length or structure.
    #[error("malformed signature: {0}")]
    MalformedSignature(&'static str),

    /// The signature does not authenticate the data under the given key.
    #[error("signature verification failed")]
    VerificationFailed,

    /// None of the candidate backends is usable in this environment.
    #[error("no ECDSA backend available")]
    NoBackendAvailable,

    /// A signing operation was given a key without a secret scalar.
    #[error("key has no secret scalar")]
    MissingSecretKey,

    /// Key material could not be converted into a backend's key form.
    #[error("invalid key: {0}")]
    InvalidKey(String),

    /// The selected backend failed while performing the operation.
    #[error("{kind} backend failed: {source}")]
    Backend {
        /// Which backend failed.
        kind: BackendKind,

        /// The underlying failure.
        #[source]
        source: signature::Error,
    },
}

impl Error {
    pub(crate) fn backend(kind: BackendKind, source: signature::Error) -> Self {
        Error::Backend { kind, source }
    }
}
