//! Backend over a synchronous, DER-speaking native provider.
//!
//! Native providers (OS keystores, OpenSSL-style bindings, or the bundled
//! [`RustCryptoProvider`]) sign and verify in one synchronous step and
//! exchange signatures as DER. This backend is the only place where DER
//! crosses the public boundary, so it transcodes on the way out of `sign`
//! and on the way into `verify`.

use super::{BackendKind, EcdsaBackend};
use crate::{
    algorithm::Suite,
    der::{concat_to_der, der_to_concat},
    error::Error,
    future::{boxed, BackendFuture},
    hash::HashName,
    key::Key,
    payload::SignaturePayload,
};
use std::{fmt::Debug, sync::Arc};

#[cfg(feature = "native")]
use crate::{
    curve::curve_for,
    key::{SigningKey, VerifyingKey},
};

/// A synchronous ECDSA provider supplied by the embedding environment.
pub trait NativeCrypto: Debug + Send + Sync {
    /// Digest names this provider can sign with, e.g. `sha256`.
    fn digests(&self) -> Vec<String>;

    /// Sign `data` with the named digest and return a DER signature.
    ///
    /// # Errors
    ///
    /// Returns `signature::Error` if the key cannot be used or signing fails.
    fn sign(&self, hash: HashName, key: &Key, data: &[u8]) -> Result<Vec<u8>, signature::Error>;

    /// Verify a DER signature. `Ok(false)` means the signature does not
    /// authenticate `data`.
    ///
    /// # Errors
    ///
    /// Returns `signature::Error` if the provider cannot perform the check.
    fn verify(
        &self,
        hash: HashName,
        key: &Key,
        data: &[u8],
        der: &[u8],
    ) -> Result<bool, signature::Error>;
}

/// [`EcdsaBackend`] over a [`NativeCrypto`] provider.
#[derive(Debug, Clone)]
pub struct NativeBackend {
    suite: Suite,
    provider: Arc<dyn NativeCrypto>,
}

impl NativeBackend {
    /// Bind `provider` to `suite` if it lists the suite's digest.
    ///
    /// This is the capability check; it is meant to run once, when the
    /// registry is built.
    #[must_use]
    pub fn probe(suite: Suite, provider: Arc<dyn NativeCrypto>) -> Option<Self> {
        let wanted = suite.hash.native_name();
        provider
            .digests()
            .iter()
            .any(|name| name == wanted)
            .then_some(NativeBackend { suite, provider })
    }
}

impl EcdsaBackend for NativeBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Native
    }

    fn sign<'a>(
        &'a self,
        key: &'a Key,
        data: &'a [u8],
    ) -> BackendFuture<'a, Result<SignaturePayload, Error>> {
        boxed(async move {
            self.suite.check_signer(key)?;
            let der = self
                .provider
                .sign(self.suite.hash, key, data)
                .map_err(|e| Error::backend(BackendKind::Native, e))?;
            let mac = der_to_concat(&der, self.suite.width)?;
            Ok(SignaturePayload::signed(data, mac))
        })
    }

    fn verify<'a>(
        &'a self,
        key: &'a Key,
        data: &'a [u8],
        mac: &'a [u8],
    ) -> BackendFuture<'a, Result<SignaturePayload, Error>> {
        boxed(async move {
            self.suite.check_verifier(key, mac)?;
            let der = concat_to_der(mac, self.suite.width)?;
            match self.provider.verify(self.suite.hash, key, data, &der) {
                Ok(true) => Ok(SignaturePayload::verified(data, mac)),
                Ok(false) => Err(Error::VerificationFailed),
                Err(e) => Err(Error::backend(BackendKind::Native, e)),
            }
        })
    }
}

/// Synchronous RustCrypto provider emitting DER signatures.
///
/// Each curve signs with its paired digest only (P-256/SHA-256,
/// P-384/SHA-384, P-521/SHA-512).
#[cfg(feature = "native")]
#[derive(Debug, Default, Clone, Copy)]
pub struct RustCryptoProvider;

#[cfg(feature = "native")]
impl RustCryptoProvider {
    fn check_pairing(hash: HashName, key: &Key) -> Result<(), signature::Error> {
        if curve_for(hash) == key.curve() {
            Ok(())
        } else {
            Err(signature::Error::from_source(format!(
                "{} cannot be used with {}",
                hash,
                key.curve()
            )))
        }
    }
}

#[cfg(feature = "native")]
impl NativeCrypto for RustCryptoProvider {
    fn digests(&self) -> Vec<String> {
        HashName::ALL
            .iter()
            .map(|hash| hash.native_name().to_string())
            .collect()
    }

    fn sign(&self, hash: HashName, key: &Key, data: &[u8]) -> Result<Vec<u8>, signature::Error> {
        use signature::Signer as _;

        Self::check_pairing(hash, key)?;
        let signing_key = key.signing_key().map_err(signature::Error::from_source)?;

        Ok(match signing_key {
            SigningKey::P256(sk) => {
                let sig: p256::ecdsa::Signature = sk.try_sign(data)?;
                sig.to_der().as_bytes().to_vec()
            }
            SigningKey::P384(sk) => {
                let sig: p384::ecdsa::Signature = sk.try_sign(data)?;
                sig.to_der().as_bytes().to_vec()
            }
            SigningKey::P521(sk) => {
                let sig: p521::ecdsa::Signature = sk.try_sign(data)?;
                sig.to_der().as_bytes().to_vec()
            }
        })
    }

    fn verify(
        &self,
        hash: HashName,
        key: &Key,
        data: &[u8],
        der: &[u8],
    ) -> Result<bool, signature::Error> {
        use signature::Verifier as _;

        Self::check_pairing(hash, key)?;
        let verifying_key = key.verifying_key().map_err(signature::Error::from_source)?;

        // A DER signature whose scalars are out of range authenticates
        // nothing, so it is reported as a mismatch.
        Ok(match verifying_key {
            VerifyingKey::P256(vk) => p256::ecdsa::Signature::from_der(der)
                .is_ok_and(|sig| vk.verify(data, &sig).is_ok()),
            VerifyingKey::P384(vk) => p384::ecdsa::Signature::from_der(der)
                .is_ok_and(|sig| vk.verify(data, &sig).is_ok()),
            VerifyingKey::P521(vk) => p521::ecdsa::Signature::from_der(der)
                .is_ok_and(|sig| vk.verify(data, &sig).is_ok()),
        })
    }
}
