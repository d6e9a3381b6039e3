//! JOSE ECDSA signing: `ES256`, `ES384` and `ES512`.
//!
//! Each algorithm binds a hash to a curve and a coordinate width. Signing and
//! verification are dispatched to the first backend the environment can
//! actually provide (native, platform, then software), and signatures always
//! cross the public API in the concatenated `r ‖ s` form that JWS uses. The
//! DER form spoken by native providers never leaks out of the
//! [`backend::native`] adapter.
//!
//! # Example
//!
//! ```rust
//! use ecdsa_jwa::{AlgorithmId, Curve, Key};
//!
//! # tokio_test::block_on(async {
//! let es384 = ecdsa_jwa::global().get(AlgorithmId::Es384);
//! let key = Key::generate(Curve::P384);
//!
//! let signed = es384.sign(&key, b"hello").await?;
//! assert_eq!(signed.mac.len(), 96);
//!
//! let verified = es384.verify(&key.to_public(), b"hello", &signed.mac).await?;
//! assert!(verified.is_valid());
//! # Ok::<_, ecdsa_jwa::Error>(())
//! # })?;
//! # Ok::<_, ecdsa_jwa::Error>(())
//! ```

#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod algorithm;
pub mod backend;
pub mod curve;
pub mod der;
pub mod error;
pub mod fallback;
pub mod future;
pub mod hash;
pub mod key;
pub mod payload;
pub mod registry;

pub use algorithm::{AlgorithmId, Suite};
pub use backend::{BackendKind, EcdsaBackend};
pub use curve::Curve;
pub use error::Error;
pub use fallback::Fallback;
pub use hash::HashName;
pub use key::{Jwk, Key};
pub use payload::SignaturePayload;
pub use registry::{global, Algorithm, Registry, RegistryBuilder};
