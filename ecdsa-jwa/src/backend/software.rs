//! Pure-software backend on RustCrypto.
//!
//! The digest is computed first through [`hash::digest`](crate::hash::digest),
//! then signed or verified as a prehash.

use super::{BackendKind, EcdsaBackend};
use crate::{
    algorithm::Suite,
    error::Error,
    future::{boxed, BackendFuture},
    hash::digest,
    key::{Key, SigningKey, VerifyingKey},
    payload::SignaturePayload,
};
use signature::hazmat::{PrehashSigner, PrehashVerifier};

/// [`EcdsaBackend`] that always works: no environment capability needed.
#[derive(Debug, Clone, Copy)]
pub struct SoftwareBackend {
    suite: Suite,
}

impl SoftwareBackend {
    /// Bind to `suite`.
    #[must_use]
    pub const fn new(suite: Suite) -> Self {
        SoftwareBackend { suite }
    }
}

impl EcdsaBackend for SoftwareBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Software
    }

    fn sign<'a>(
        &'a self,
        key: &'a Key,
        data: &'a [u8],
    ) -> BackendFuture<'a, Result<SignaturePayload, Error>> {
        boxed(async move {
            self.suite.check_signer(key)?;
            let signing_key = key.signing_key()?;
            let prehash = digest(self.suite.hash, data).await;

            let mac = match signing_key {
                SigningKey::P256(sk) => {
                    let sig: p256::ecdsa::Signature =
                        sk.sign_prehash(&prehash).map_err(software)?;
                    sig.to_bytes().to_vec()
                }
                SigningKey::P384(sk) => {
                    let sig: p384::ecdsa::Signature =
                        sk.sign_prehash(&prehash).map_err(software)?;
                    sig.to_bytes().to_vec()
                }
                SigningKey::P521(sk) => {
                    let sig: p521::ecdsa::Signature =
                        sk.sign_prehash(&prehash).map_err(software)?;
                    sig.to_bytes().to_vec()
                }
            };

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
            let verifying_key = key.verifying_key()?;
            let prehash = digest(self.suite.hash, data).await;

            // Scalars outside [1, n) cannot authenticate anything.
            let valid = match verifying_key {
                VerifyingKey::P256(vk) => p256::ecdsa::Signature::from_slice(mac)
                    .is_ok_and(|sig| vk.verify_prehash(&prehash, &sig).is_ok()),
                VerifyingKey::P384(vk) => p384::ecdsa::Signature::from_slice(mac)
                    .is_ok_and(|sig| vk.verify_prehash(&prehash, &sig).is_ok()),
                VerifyingKey::P521(vk) => p521::ecdsa::Signature::from_slice(mac)
                    .is_ok_and(|sig| vk.verify_prehash(&prehash, &sig).is_ok()),
            };

            if valid {
                Ok(SignaturePayload::verified(data, mac))
            } else {
                Err(Error::VerificationFailed)
            }
        })
    }
}

fn software(source: signature::Error) -> Error {
    Error::backend(BackendKind::Software, source)
}
