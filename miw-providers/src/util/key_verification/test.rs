use std::sync::Arc;

use serde_json::json;

use super::KeyVerification;
use crate::{
    common_models::did::DidValue,
    credential_formatter::model::TokenVerifier,
    crypto::{imp::CryptoProviderImpl, SignerError},
    did::{error::DidResolverError, model::DidDocument, MockDidResolver},
    key_algorithm::{
        imp::provider::KeyAlgorithmProviderImpl, model::GeneratedKey,
        provider::KeyAlgorithmProvider, KeyAlgorithmType,
    },
};

const ISSUER: &str = "did:web:localhost:BPNL000000000000";

fn key_algorithm_provider() -> Arc<dyn KeyAlgorithmProvider> {
    Arc::new(KeyAlgorithmProviderImpl::with_default_algorithms(Arc::new(
        CryptoProviderImpl::default(),
    )))
}

fn generate(provider: &dyn KeyAlgorithmProvider, algorithm: KeyAlgorithmType) -> GeneratedKey {
    provider
        .get_key_algorithm(algorithm)
        .unwrap()
        .generate_key_pair()
}

fn document(
    provider: &dyn KeyAlgorithmProvider,
    keys: &[(&str, KeyAlgorithmType, &[u8])],
) -> DidDocument {
    let methods: Vec<_> = keys
        .iter()
        .map(|(name, algorithm, public)| {
            json!({
                "id": format!("{ISSUER}#{name}"),
                "type": "JsonWebKey2020",
                "controller": ISSUER,
                "publicKeyJwk": provider
                    .get_key_algorithm(*algorithm)
                    .unwrap()
                    .bytes_to_jwk(public)
                    .unwrap()
            })
        })
        .collect();

    serde_json::from_value(json!({
        "@context": ["https://www.w3.org/ns/did/v1"],
        "id": ISSUER,
        "verificationMethod": methods,
        "assertionMethod": [format!("{ISSUER}#{}", keys[0].0)]
    }))
    .unwrap()
}

fn sign(
    provider: &dyn KeyAlgorithmProvider,
    algorithm: KeyAlgorithmType,
    key: &GeneratedKey,
    message: &[u8],
) -> Vec<u8> {
    provider
        .get_signer(algorithm)
        .unwrap()
        .sign(message, &key.public, &key.private)
        .unwrap()
}

fn verification(document: DidDocument) -> KeyVerification {
    let mut did_resolver = MockDidResolver::default();
    did_resolver
        .expect_resolve()
        .returning(move |_| Ok(document.clone()));

    KeyVerification {
        did_resolver: Arc::new(did_resolver),
        key_algorithm_provider: key_algorithm_provider(),
    }
}

#[tokio::test]
async fn test_verify_by_key_id() {
    let provider = key_algorithm_provider();
    let eddsa = generate(provider.as_ref(), KeyAlgorithmType::Eddsa);
    let es256 = generate(provider.as_ref(), KeyAlgorithmType::Es256);
    let verification = verification(document(
        provider.as_ref(),
        &[
            ("eddsa", KeyAlgorithmType::Eddsa, eddsa.public.as_slice()),
            ("es256", KeyAlgorithmType::Es256, es256.public.as_slice()),
        ],
    ));

    let signature = sign(provider.as_ref(), KeyAlgorithmType::Es256, &es256, b"message");

    verification
        .verify(
            Some(DidValue::from(ISSUER)),
            Some(&format!("{ISSUER}#es256")),
            KeyAlgorithmType::Es256,
            b"message",
            &signature,
        )
        .await
        .unwrap();

    let result = verification
        .verify(
            Some(DidValue::from(ISSUER)),
            Some(&format!("{ISSUER}#es256")),
            KeyAlgorithmType::Es256,
            b"tampered",
            &signature,
        )
        .await;
    assert!(result.is_err());
}

#[tokio::test]
async fn test_verify_defaults_to_assertion_method() {
    let provider = key_algorithm_provider();
    let eddsa = generate(provider.as_ref(), KeyAlgorithmType::Eddsa);
    let verification = verification(document(
        provider.as_ref(),
        &[("eddsa", KeyAlgorithmType::Eddsa, eddsa.public.as_slice())],
    ));

    let signature = sign(provider.as_ref(), KeyAlgorithmType::Eddsa, &eddsa, b"message");

    verification
        .verify(
            Some(DidValue::from(ISSUER)),
            None,
            KeyAlgorithmType::Eddsa,
            b"message",
            &signature,
        )
        .await
        .unwrap();
}

#[tokio::test]
async fn test_verify_rejects_algorithm_mismatch() {
    let provider = key_algorithm_provider();
    let eddsa = generate(provider.as_ref(), KeyAlgorithmType::Eddsa);
    let verification = verification(document(
        provider.as_ref(),
        &[("eddsa", KeyAlgorithmType::Eddsa, eddsa.public.as_slice())],
    ));

    let result = verification
        .verify(
            Some(DidValue::from(ISSUER)),
            Some(&format!("{ISSUER}#eddsa")),
            KeyAlgorithmType::Es256,
            b"message",
            b"signature",
        )
        .await;

    assert!(matches!(result, Err(SignerError::CouldNotVerify(_))));
}

#[tokio::test]
async fn test_verify_rejects_foreign_key_and_unknown_key() {
    let provider = key_algorithm_provider();
    let eddsa = generate(provider.as_ref(), KeyAlgorithmType::Eddsa);
    let verification = verification(document(
        provider.as_ref(),
        &[("eddsa", KeyAlgorithmType::Eddsa, eddsa.public.as_slice())],
    ));

    let result = verification
        .verify(
            Some(DidValue::from(ISSUER)),
            Some("did:web:localhost:BPNL000000000001#eddsa"),
            KeyAlgorithmType::Eddsa,
            b"message",
            b"signature",
        )
        .await;
    assert!(matches!(result, Err(SignerError::CouldNotVerify(_))));

    let result = verification
        .verify(
            Some(DidValue::from(ISSUER)),
            Some(&format!("{ISSUER}#missing")),
            KeyAlgorithmType::Eddsa,
            b"message",
            b"signature",
        )
        .await;
    assert!(matches!(result, Err(SignerError::MissingKey)));
}

#[tokio::test]
async fn test_verify_fails_when_resolution_fails() {
    let mut did_resolver = MockDidResolver::default();
    did_resolver
        .expect_resolve()
        .returning(|_| Err(DidResolverError::ResolutionError("offline".to_string())));
    let verification = KeyVerification {
        did_resolver: Arc::new(did_resolver),
        key_algorithm_provider: key_algorithm_provider(),
    };

    let result = verification
        .verify(
            Some(DidValue::from(ISSUER)),
            None,
            KeyAlgorithmType::Eddsa,
            b"message",
            b"signature",
        )
        .await;

    assert!(matches!(result, Err(SignerError::CouldNotVerify(_))));
}
