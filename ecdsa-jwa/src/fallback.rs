//! Capability-based fallback between backends.
//!
//! A [`Fallback`] holds an ordered preference list of optional backends.
//! Absence (`None`) is decided once, when the list is built; at call time the
//! first present backend serves the call and its result is returned as is.
//! An operational error from that backend is never retried on the next
//! candidate, so "unavailable" and "failed" cannot be confused.

use crate::{
    backend::{BackendKind, EcdsaBackend},
    error::Error,
    future::{boxed, BackendFuture},
    key::Key,
    payload::SignaturePayload,
};
use futures::future;

/// Ordered list of optional backends; the first present one serves calls.
#[derive(Debug, Clone)]
pub struct Fallback<B> {
    candidates: Vec<Option<B>>,
}

impl<B: EcdsaBackend> Fallback<B> {
    /// Build from an ordered preference list.
    pub fn build(candidates: impl IntoIterator<Item = Option<B>>) -> Self {
        Fallback {
            candidates: candidates.into_iter().collect(),
        }
    }

    /// The backend that will serve calls, if any.
    pub fn selected(&self) -> Option<&B> {
        self.candidates.iter().flatten().next()
    }

    /// Kind of the serving backend, if any.
    pub fn selected_kind(&self) -> Option<BackendKind> {
        self.selected().map(EcdsaBackend::kind)
    }

    /// Kinds of all present candidates, in preference order.
    pub fn available(&self) -> Vec<BackendKind> {
        self.candidates.iter().flatten().map(EcdsaBackend::kind).collect()
    }

    /// Sign with the first present backend.
    ///
    /// # Errors
    ///
    /// [`Error::NoBackendAvailable`] if every slot is empty, otherwise
    /// whatever the serving backend returns.
    pub fn sign<'a>(
        &'a self,
        key: &'a Key,
        data: &'a [u8],
    ) -> BackendFuture<'a, Result<SignaturePayload, Error>> {
        match self.selected() {
            Some(backend) => backend.sign(key, data),
            None => boxed(future::ready(Err(Error::NoBackendAvailable))),
        }
    }

    /// Verify with the first present backend.
    ///
    /// # Errors
    ///
    /// [`Error::NoBackendAvailable`] if every slot is empty, otherwise
    /// whatever the serving backend returns.
    pub fn verify<'a>(
        &'a self,
        key: &'a Key,
        data: &'a [u8],
        mac: &'a [u8],
    ) -> BackendFuture<'a, Result<SignaturePayload, Error>> {
        match self.selected() {
            Some(backend) => backend.verify(key, data, mac),
            None => boxed(future::ready(Err(Error::NoBackendAvailable))),
        }
    }
}
