//! ECDSA backends.
//!
//! Every backend implements [`EcdsaBackend`] for one [`Suite`](crate::algorithm::Suite)
//! and returns signatures in the concatenated `r ‖ s` form, whatever its
//! underlying provider speaks.
//!
//! | Backend | Provider | Signature form at the provider |
//! |---|---|---|
//! | [`native`] | synchronous [`NativeCrypto`](native::NativeCrypto) | DER |
//! | [`web_crypto`] (`wasm32`) | WebCrypto `SubtleCrypto` | `r ‖ s` |
//! | [`software`] | RustCrypto prehash signing | `r ‖ s` |

pub mod native;

#[cfg(feature = "software")]
pub mod software;

#[cfg(all(feature = "web_crypto", target_arch = "wasm32"))]
pub mod web_crypto;

use crate::{error::Error, future::BackendFuture, key::Key, payload::SignaturePayload};
use std::{fmt, sync::Arc};

/// The closed set of backend variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum BackendKind {
    /// Synchronous embedding-environment primitive speaking DER.
    Native,

    /// The platform's asynchronous crypto API (WebCrypto).
    Platform,

    /// Pure-software implementation.
    Software,
}

impl BackendKind {
    /// Default preference: fastest first.
    pub const DEFAULT_PREFERENCE: [BackendKind; 3] = [
        BackendKind::Native,
        BackendKind::Platform,
        BackendKind::Software,
    ];
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            BackendKind::Native => "native",
            BackendKind::Platform => "platform",
            BackendKind::Software => "software",
        })
    }
}

/// Sign and verify for one algorithm suite.
pub trait EcdsaBackend: fmt::Debug + Send + Sync {
    /// Which variant this is.
    fn kind(&self) -> BackendKind;

    /// Sign `data`, returning the concatenated signature in `mac`.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidCurve`] and [`Error::MissingSecretKey`] before any
    /// cryptographic work; [`Error::Backend`] if the provider fails.
    fn sign<'a>(
        &'a self,
        key: &'a Key,
        data: &'a [u8],
    ) -> BackendFuture<'a, Result<SignaturePayload, Error>>;

    /// Verify a concatenated signature over `data`.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidCurve`] and [`Error::MalformedSignature`] before any
    /// cryptographic work; [`Error::VerificationFailed`] on mismatch;
    /// [`Error::Backend`] if the provider fails.
    fn verify<'a>(
        &'a self,
        key: &'a Key,
        data: &'a [u8],
        mac: &'a [u8],
    ) -> BackendFuture<'a, Result<SignaturePayload, Error>>;
}

impl<T: EcdsaBackend + ?Sized> EcdsaBackend for Arc<T> {
    fn kind(&self) -> BackendKind {
        (**self).kind()
    }

    fn sign<'a>(
        &'a self,
        key: &'a Key,
        data: &'a [u8],
    ) -> BackendFuture<'a, Result<SignaturePayload, Error>> {
        (**self).sign(key, data)
    }

    fn verify<'a>(
        &'a self,
        key: &'a Key,
        data: &'a [u8],
        mac: &'a [u8],
    ) -> BackendFuture<'a, Result<SignaturePayload, Error>> {
        (**self).verify(key, data, mac)
    }
}
