#![cfg(not(target_arch = "wasm32"))]

use assert_matches::assert_matches;
use ecdsa_jwa::{global, AlgorithmId, Curve, Error, Jwk, Key, Registry};
use futures::future::join_all;
use pretty_assertions::assert_eq;
use testresult::TestResult;

#[test_log::test(tokio::test)]
async fn test_sign_verify_every_algorithm() -> TestResult {
    for algorithm in global().iter() {
        let suite = algorithm.suite();
        let key = Key::generate(suite.curve);

        let signed = algorithm.sign(&key, b"payload").await?;
        assert_eq!(signed.data, b"payload");
        assert_eq!(signed.mac.len(), 2 * suite.width);
        assert_eq!(signed.valid, None);

        let verified = algorithm
            .verify(&key.to_public(), b"payload", &signed.mac)
            .await?;
        assert_eq!(verified.valid, Some(true));
        assert_eq!(verified.mac, signed.mac);
    }
    Ok(())
}

#[test_log::test(tokio::test)]
async fn test_signature_widths() -> TestResult {
    let expected = [
        (AlgorithmId::Es256, 64),
        (AlgorithmId::Es384, 96),
        (AlgorithmId::Es512, 132),
    ];
    for (alg, len) in expected {
        let algorithm = global().get(alg);
        let key = Key::generate(algorithm.suite().curve);
        assert_eq!(algorithm.sign(&key, b"").await?.mac.len(), len);
    }
    Ok(())
}

#[test_log::test(tokio::test)]
async fn test_curve_mismatch() -> TestResult {
    let p256 = Key::generate(Curve::P256);
    let es384 = global().get(AlgorithmId::Es384);

    assert_matches!(
        es384.sign(&p256, b"x").await,
        Err(Error::InvalidCurve {
            expected: Curve::P384,
            actual: Curve::P256
        })
    );
    assert_matches!(
        es384.verify(&p256, b"x", &[1; 96]).await,
        Err(Error::InvalidCurve { .. })
    );
    Ok(())
}

#[test_log::test(tokio::test)]
async fn test_wrong_length_mac() -> TestResult {
    let key = Key::generate(Curve::P521);
    let es512 = global().get(AlgorithmId::Es512);

    for len in [0, 131, 133, 139] {
        assert_matches!(
            es512.verify(&key, b"x", &vec![1; len]).await,
            Err(Error::MalformedSignature(_))
        );
    }
    Ok(())
}

#[test_log::test(tokio::test)]
async fn test_public_key_cannot_sign() -> TestResult {
    let key = Key::generate(Curve::P256).to_public();
    assert_matches!(
        global().get(AlgorithmId::Es256).sign(&key, b"x").await,
        Err(Error::MissingSecretKey)
    );
    Ok(())
}

#[test_log::test(tokio::test)]
async fn test_verify_with_jwk_roundtrip() -> TestResult {
    let key = Key::generate(Curve::P384);
    let es384 = global().get(AlgorithmId::Es384);
    let signed = es384.sign(&key, b"jwk").await?;

    let json = serde_json::to_string(&key.to_public().to_jwk())?;
    assert!(!json.contains("\"d\""));
    let jwk: Jwk = serde_json::from_str(&json)?;
    let public = Key::from_jwk(&jwk)?;

    assert!(es384.verify(&public, b"jwk", &signed.mac).await?.is_valid());
    Ok(())
}

#[test_log::test(tokio::test)]
async fn test_concurrent_operations() -> TestResult {
    let key = Key::generate(Curve::P256);
    let es256 = global().get(AlgorithmId::Es256);
    let messages: Vec<Vec<u8>> = (0..16u8).map(|i| vec![i; 32]).collect();

    let signed = join_all(messages.iter().map(|m| es256.sign(&key, m))).await;
    let signed = signed.into_iter().collect::<Result<Vec<_>, _>>()?;

    let verified = join_all(
        messages
            .iter()
            .zip(&signed)
            .map(|(m, s)| es256.verify(&key, m, &s.mac)),
    )
    .await;
    for result in verified {
        assert!(result?.is_valid());
    }
    Ok(())
}

#[test_log::test(tokio::test)]
async fn test_concurrent_across_threads() -> TestResult {
    let mut handles = Vec::new();
    for alg in AlgorithmId::ALL {
        handles.push(tokio::spawn(async move {
            let algorithm = global().get(alg);
            let key = Key::generate(algorithm.suite().curve);
            let signed = algorithm.sign(&key, b"threads").await?;
            algorithm.verify(&key, b"threads", &signed.mac).await
        }));
    }
    for handle in handles {
        assert!(handle.await??.is_valid());
    }
    Ok(())
}

#[test]
fn test_lookup_by_name() -> TestResult {
    let registry = Registry::default();
    assert_eq!(registry.by_name("ES512")?.suite().width, 66);
    assert_matches!(
        registry.by_name("ES256K"),
        Err(Error::UnsupportedAlgorithm(_))
    );
    Ok(())
}
