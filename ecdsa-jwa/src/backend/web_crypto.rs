//! WebCrypto-based ECDSA for WASM environments.
//!
//! Keys are imported per call as single-use, non-extractable `CryptoKey`s
//! scoped to the `ECDSA` algorithm, the suite's named curve and a single
//! usage. WebCrypto hashes internally and already produces and consumes the
//! concatenated `r ‖ s` form, so no DER handling happens here.

use super::{BackendKind, EcdsaBackend};
use crate::{
    algorithm::Suite,
    curve::Curve,
    error::Error,
    future::{boxed, BackendFuture},
    key::Key,
    payload::SignaturePayload,
};
use js_sys::{Array, Object, Reflect, Uint8Array};
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys::{CryptoKey, SubtleCrypto};

/// Named curves every WebCrypto implementation accepts for ECDSA.
const NAMED_CURVES: [Curve; 3] = [Curve::P256, Curve::P384, Curve::P521];

/// [`EcdsaBackend`] over the global `crypto.subtle`.
#[derive(Debug, Clone, Copy)]
pub struct WebCryptoBackend {
    suite: Suite,
}

impl WebCryptoBackend {
    /// Bind to `suite` if `crypto.subtle` exists and supports the curve.
    ///
    /// This is the capability check; it is meant to run once, when the
    /// registry is built.
    #[must_use]
    pub fn probe(suite: Suite) -> Option<Self> {
        (get_subtle_crypto().is_ok() && NAMED_CURVES.contains(&suite.curve))
            .then_some(WebCryptoBackend { suite })
    }

    fn sign_params(&self) -> Result<Object, signature::Error> {
        let hash = Object::new();
        set(&hash, "name", self.suite.hash.name())?;

        let params = Object::new();
        set(&params, "name", "ECDSA")?;
        Reflect::set(&params, &"hash".into(), &hash).map_err(js_error)?;
        Ok(params)
    }

    /// Import `key` as a single-use `CryptoKey` for `usage`.
    async fn import(
        &self,
        subtle: &SubtleCrypto,
        key: &Key,
        usage: &str,
    ) -> Result<CryptoKey, Error> {
        let jwk = if usage == "sign" {
            key.to_jwk()
        } else {
            key.to_public().to_jwk()
        };

        let key_data = Object::new();
        set(&key_data, "kty", &jwk.kty).map_err(platform)?;
        set(&key_data, "crv", jwk.crv.name()).map_err(platform)?;
        set(&key_data, "x", &jwk.x).map_err(platform)?;
        set(&key_data, "y", &jwk.y).map_err(platform)?;
        if let Some(d) = &jwk.d {
            set(&key_data, "d", d).map_err(platform)?;
        }

        let algorithm = Object::new();
        set(&algorithm, "name", "ECDSA").map_err(platform)?;
        set(&algorithm, "namedCurve", self.suite.curve.name()).map_err(platform)?;

        let usages = Array::new();
        usages.push(&usage.into());

        let promise = subtle
            .import_key_with_object("jwk", &key_data, &algorithm, false, &usages)
            .map_err(|e| platform(js_error(e)))?;

        Ok(JsFuture::from(promise)
            .await
            .map_err(|e| platform(js_error(e)))?
            .unchecked_into())
    }
}

impl EcdsaBackend for WebCryptoBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Platform
    }

    fn sign<'a>(
        &'a self,
        key: &'a Key,
        data: &'a [u8],
    ) -> BackendFuture<'a, Result<SignaturePayload, Error>> {
        boxed(async move {
            self.suite.check_signer(key)?;
            let subtle = get_subtle_crypto().map_err(platform)?;
            let crypto_key = self.import(&subtle, key, "sign").await?;

            let params = self.sign_params().map_err(platform)?;
            let promise = subtle
                .sign_with_object_and_buffer_source(&params, &crypto_key, &Uint8Array::from(data))
                .map_err(|e| platform(js_error(e)))?;
            let output = JsFuture::from(promise)
                .await
                .map_err(|e| platform(js_error(e)))?;

            let mac = Uint8Array::new(&output).to_vec();
            if mac.len() != 2 * self.suite.width {
                return Err(platform(signature::Error::from_source(format!(
                    "expected {} bytes, got {}",
                    2 * self.suite.width,
                    mac.len()
                ))));
            }

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
            let subtle = get_subtle_crypto().map_err(platform)?;
            let crypto_key = self.import(&subtle, key, "verify").await?;

            let params = self.sign_params().map_err(platform)?;
            let promise = subtle
                .verify_with_object_and_buffer_source_and_buffer_source(
                    &params,
                    &crypto_key,
                    &Uint8Array::from(mac),
                    &Uint8Array::from(data),
                )
                .map_err(|e| platform(js_error(e)))?;
            let valid = JsFuture::from(promise)
                .await
                .map_err(|e| platform(js_error(e)))?;

            if valid.as_bool() == Some(true) {
                Ok(SignaturePayload::verified(data, mac))
            } else {
                Err(Error::VerificationFailed)
            }
        })
    }
}

/// Get the SubtleCrypto interface.
fn get_subtle_crypto() -> Result<SubtleCrypto, signature::Error> {
    let global = js_sys::global();

    let crypto = Reflect::get(&global, &"crypto".into())
        .map_err(|_| signature::Error::from_source("crypto not found on global"))?;
    if crypto.is_undefined() {
        return Err(signature::Error::from_source("crypto is undefined"));
    }

    let subtle = Reflect::get(&crypto, &"subtle".into())
        .map_err(|_| signature::Error::from_source("subtle not found on crypto"))?;
    if subtle.is_undefined() {
        return Err(signature::Error::from_source("crypto.subtle is undefined"));
    }

    Ok(subtle.unchecked_into())
}

fn set(target: &Object, field: &str, value: &str) -> Result<(), signature::Error> {
    Reflect::set(target, &field.into(), &value.into())
        .map(|_| ())
        .map_err(js_error)
}

fn js_error(e: JsValue) -> signature::Error {
    signature::Error::from_source(format!("{e:?}"))
}

fn platform(source: signature::Error) -> Error {
    Error::backend(BackendKind::Platform, source)
}
