//! Future type returned by backends.
//!
//! On native targets every backend future is [`Send`], so callers can drive
//! sign and verify calls from multi-threaded runtimes such as `tokio`.
//! WebCrypto promises are tied to the JS event loop and are `!Send`, so on
//! `wasm32` the boxed future is local instead.

#[cfg(not(target_arch = "wasm32"))]
use futures::future::BoxFuture;
#[cfg(target_arch = "wasm32")]
use futures::future::LocalBoxFuture;

/// A boxed future, [`Send`] unless compiled for `wasm32`.
#[cfg(not(target_arch = "wasm32"))]
pub type BackendFuture<'a, T> = BoxFuture<'a, T>;

/// A boxed future, [`Send`] unless compiled for `wasm32`.
#[cfg(target_arch = "wasm32")]
pub type BackendFuture<'a, T> = LocalBoxFuture<'a, T>;

/// Box a future into a [`BackendFuture`].
#[cfg(not(target_arch = "wasm32"))]
pub fn boxed<'a, T>(
    fut: impl std::future::Future<Output = T> + Send + 'a,
) -> BackendFuture<'a, T> {
    Box::pin(fut)
}

/// Box a future into a [`BackendFuture`].
#[cfg(target_arch = "wasm32")]
pub fn boxed<'a, T>(fut: impl std::future::Future<Output = T> + 'a) -> BackendFuture<'a, T> {
    Box::pin(fut)
}
