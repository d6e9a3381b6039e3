//! The `ES256`/`ES384`/`ES512` algorithm table.
//!
//! The registry resolves each algorithm's suite, probes every backend's
//! capability once, and wires the results into a [`Fallback`]. After
//! [`RegistryBuilder::build`] the table is immutable and can be shared freely
//! between threads.

use crate::{
    algorithm::{AlgorithmId, Suite},
    backend::{native::NativeBackend, native::NativeCrypto, BackendKind, EcdsaBackend},
    error::Error,
    fallback::Fallback,
    key::Key,
    payload::SignaturePayload,
};
use std::sync::{Arc, OnceLock};

/// One algorithm's public `{sign, verify}` pair.
#[derive(Debug, Clone)]
pub struct Algorithm {
    id: AlgorithmId,
    suite: Suite,
    dispatch: Fallback<Arc<dyn EcdsaBackend>>,
}

impl Algorithm {
    /// The algorithm identifier.
    #[must_use]
    pub const fn id(&self) -> AlgorithmId {
        self.id
    }

    /// The bound `(hash, curve, width)` triple.
    #[must_use]
    pub const fn suite(&self) -> Suite {
        self.suite
    }

    /// The backend serving this algorithm, if any.
    #[must_use]
    pub fn backend(&self) -> Option<BackendKind> {
        self.dispatch.selected_kind()
    }

    /// Sign `data`. The returned `mac` is always the concatenated `r ‖ s`
    /// form, whichever backend ran.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidCurve`] if the key is not on this algorithm's curve
    ///   (checked before any backend is touched)
    /// - [`Error::MissingSecretKey`] for a verification-only key
    /// - [`Error::NoBackendAvailable`] if no backend is usable
    /// - [`Error::Backend`] if the backend fails
    #[tracing::instrument(skip_all, fields(alg = %self.id, backend = ?self.backend()))]
    pub async fn sign(&self, key: &Key, data: &[u8]) -> Result<SignaturePayload, Error> {
        self.suite.check_curve(key.curve())?;
        self.dispatch.sign(key, data).await
    }

    /// Verify a concatenated signature. Success always carries
    /// `valid: Some(true)`.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidCurve`] if the key is not on this algorithm's curve
    ///   (checked before any backend is touched)
    /// - [`Error::MalformedSignature`] if `mac` is not `2 * width` bytes
    /// - [`Error::VerificationFailed`] if the signature does not match
    /// - [`Error::NoBackendAvailable`] if no backend is usable
    /// - [`Error::Backend`] if the backend fails
    #[tracing::instrument(skip_all, fields(alg = %self.id, backend = ?self.backend()))]
    pub async fn verify(
        &self,
        key: &Key,
        data: &[u8],
        mac: &[u8],
    ) -> Result<SignaturePayload, Error> {
        self.suite.check_curve(key.curve())?;
        self.dispatch.verify(key, data, mac).await
    }
}

/// Immutable `AlgorithmId → Algorithm` table.
#[derive(Debug, Clone)]
pub struct Registry {
    algorithms: [Algorithm; 3],
}

impl Registry {
    /// Start configuring a registry.
    #[must_use]
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::default()
    }

    /// Look up an algorithm.
    #[must_use]
    pub fn get(&self, id: AlgorithmId) -> &Algorithm {
        let [es256, es384, es512] = &self.algorithms;
        match id {
            AlgorithmId::Es256 => es256,
            AlgorithmId::Es384 => es384,
            AlgorithmId::Es512 => es512,
        }
    }

    /// Look up an algorithm by its JOSE name.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnsupportedAlgorithm`] for anything other than
    /// `ES256`, `ES384`, `ES512`.
    pub fn by_name(&self, alg: &str) -> Result<&Algorithm, Error> {
        Ok(self.get(alg.parse()?))
    }

    /// All algorithms in `ES256`, `ES384`, `ES512` order.
    pub fn iter(&self) -> impl Iterator<Item = &Algorithm> {
        self.algorithms.iter()
    }
}

impl Default for Registry {
    /// Registry with the default backends.
    ///
    /// # Panics
    ///
    /// Never in practice: the three algorithms always map to supported
    /// hashes.
    fn default() -> Self {
        RegistryBuilder::default()
            .build()
            .expect("ES256, ES384 and ES512 map to supported hashes")
    }
}

/// Process-wide registry with the default backends, built on first use.
pub fn global() -> &'static Registry {
    static REGISTRY: OnceLock<Registry> = OnceLock::new();
    REGISTRY.get_or_init(Registry::default)
}

/// Configures which backends a [`Registry`] may use and in which order.
///
/// By default the native provider is the bundled
/// [`RustCryptoProvider`](crate::backend::native::RustCryptoProvider) (with
/// the `native` feature), the platform backend is used where WebCrypto is
/// available, the software backend is enabled with the `software` feature,
/// and the order is native, platform, software.
#[derive(Debug, Clone)]
pub struct RegistryBuilder {
    native: Option<Arc<dyn NativeCrypto>>,
    platform: bool,
    software: bool,
    preference: [BackendKind; 3],
}

impl Default for RegistryBuilder {
    fn default() -> Self {
        RegistryBuilder {
            native: default_native_provider(),
            platform: true,
            software: cfg!(feature = "software"),
            preference: BackendKind::DEFAULT_PREFERENCE,
        }
    }
}

impl RegistryBuilder {
    /// Use `provider` for the native backend.
    #[must_use]
    pub fn native_provider(mut self, provider: Arc<dyn NativeCrypto>) -> Self {
        self.native = Some(provider);
        self
    }

    /// Never use a native backend.
    #[must_use]
    pub fn without_native(mut self) -> Self {
        self.native = None;
        self
    }

    /// Never use the platform backend.
    #[must_use]
    pub const fn without_platform(mut self) -> Self {
        self.platform = false;
        self
    }

    /// Never use the software backend.
    #[must_use]
    pub const fn without_software(mut self) -> Self {
        self.software = false;
        self
    }

    /// Order in which backends are tried.
    #[must_use]
    pub const fn preference(mut self, preference: [BackendKind; 3]) -> Self {
        self.preference = preference;
        self
    }

    /// Resolve suites, probe capabilities and build the table.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnsupportedHash`] if an algorithm does not map to a
    /// supported hash.
    #[tracing::instrument(skip_all)]
    pub fn build(self) -> Result<Registry, Error> {
        let [es256, es384, es512] = AlgorithmId::ALL;
        Ok(Registry {
            algorithms: [
                self.algorithm(es256)?,
                self.algorithm(es384)?,
                self.algorithm(es512)?,
            ],
        })
    }

    fn algorithm(&self, id: AlgorithmId) -> Result<Algorithm, Error> {
        let suite = id.suite()?;
        let dispatch = Fallback::build(self.preference.iter().map(|kind| self.probe(*kind, suite)));

        tracing::debug!(
            alg = %id,
            available = ?dispatch.available(),
            selected = ?dispatch.selected_kind(),
            "resolved ECDSA backends"
        );

        Ok(Algorithm {
            id,
            suite,
            dispatch,
        })
    }

    fn probe(&self, kind: BackendKind, suite: Suite) -> Option<Arc<dyn EcdsaBackend>> {
        match kind {
            BackendKind::Native => self
                .native
                .clone()
                .and_then(|provider| NativeBackend::probe(suite, provider))
                .map(|backend| Arc::new(backend) as Arc<dyn EcdsaBackend>),
            BackendKind::Platform if self.platform => platform_backend(suite),
            BackendKind::Software if self.software => software_backend(suite),
            BackendKind::Platform | BackendKind::Software => None,
        }
    }
}

#[cfg(feature = "native")]
fn default_native_provider() -> Option<Arc<dyn NativeCrypto>> {
    Some(Arc::new(crate::backend::native::RustCryptoProvider))
}

#[cfg(not(feature = "native"))]
fn default_native_provider() -> Option<Arc<dyn NativeCrypto>> {
    None
}

#[cfg(all(feature = "web_crypto", target_arch = "wasm32"))]
fn platform_backend(suite: Suite) -> Option<Arc<dyn EcdsaBackend>> {
    crate::backend::web_crypto::WebCryptoBackend::probe(suite)
        .map(|backend| Arc::new(backend) as Arc<dyn EcdsaBackend>)
}

#[cfg(not(all(feature = "web_crypto", target_arch = "wasm32")))]
fn platform_backend(_suite: Suite) -> Option<Arc<dyn EcdsaBackend>> {
    None
}

#[cfg(feature = "software")]
fn software_backend(suite: Suite) -> Option<Arc<dyn EcdsaBackend>> {
    Some(Arc::new(crate::backend::software::SoftwareBackend::new(suite)))
}

#[cfg(not(feature = "software"))]
fn software_backend(_suite: Suite) -> Option<Arc<dyn EcdsaBackend>> {
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::curve::Curve;
    use assert_matches::assert_matches;
    use testresult::TestResult;

    #[test]
    fn test_get_matches_id() {
        let registry = Registry::default();
        for alg in AlgorithmId::ALL {
            assert_eq!(registry.get(alg).id(), alg);
        }
        let ids: Vec<_> = registry.iter().map(Algorithm::id).collect();
        assert_eq!(ids, AlgorithmId::ALL);
    }

    #[test]
    fn test_by_name() -> TestResult {
        let registry = Registry::default();
        assert_eq!(registry.by_name("ES384")?.suite().curve, Curve::P384);
        assert_matches!(registry.by_name("HS256"), Err(Error::UnsupportedAlgorithm(_)));
        Ok(())
    }

    #[test]
    fn test_global_is_built_once() {
        assert!(std::ptr::eq(global(), global()));
    }

    #[test]
    fn test_registry_is_shareable() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Registry>();
    }

    #[cfg(all(feature = "native", feature = "software"))]
    #[test]
    fn test_default_prefers_native() {
        let registry = Registry::default();
        for algorithm in registry.iter() {
            assert_eq!(algorithm.backend(), Some(BackendKind::Native));
        }
    }

    #[cfg(feature = "software")]
    #[test]
    fn test_without_native_falls_back_to_software() -> TestResult {
        let registry = Registry::builder().without_native().build()?;
        for algorithm in registry.iter() {
            assert_eq!(algorithm.backend(), Some(BackendKind::Software));
        }
        Ok(())
    }

    #[test]
    fn test_preference_order() -> TestResult {
        let registry = Registry::builder()
            .preference([
                BackendKind::Software,
                BackendKind::Platform,
                BackendKind::Native,
            ])
            .build()?;
        let expected = if cfg!(feature = "software") {
            Some(BackendKind::Software)
        } else if cfg!(feature = "native") {
            Some(BackendKind::Native)
        } else {
            None
        };
        assert_eq!(registry.get(AlgorithmId::Es512).backend(), expected);
        Ok(())
    }

    #[test_log::test(tokio::test)]
    async fn test_no_backend() -> TestResult {
        let registry = Registry::builder()
            .without_native()
            .without_platform()
            .without_software()
            .build()?;
        let key = Key::generate(Curve::P256);
        let algorithm = registry.get(AlgorithmId::Es256);

        assert_eq!(algorithm.backend(), None);
        assert_matches!(
            algorithm.sign(&key, b"x").await,
            Err(Error::NoBackendAvailable)
        );
        assert_matches!(
            algorithm.verify(&key, b"x", &[1; 64]).await,
            Err(Error::NoBackendAvailable)
        );
        Ok(())
    }

    #[test_log::test(tokio::test)]
    async fn test_invalid_curve_even_without_backend() -> TestResult {
        let registry = Registry::builder()
            .without_native()
            .without_platform()
            .without_software()
            .build()?;
        let key = Key::generate(Curve::P256);

        assert_matches!(
            registry.get(AlgorithmId::Es384).sign(&key, b"x").await,
            Err(Error::InvalidCurve {
                expected: Curve::P384,
                actual: Curve::P256
            })
        );
        Ok(())
    }
}
