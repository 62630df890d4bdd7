use std::sync::Arc;

use mockall::predicate::eq;

use miw_providers::{
    common_models::{
        did::{Bpn, DidValue},
        key::WalletKey,
    },
    did::{model::JSON_WEB_KEY_2020, DidResolver, MockDidResolver},
    key_algorithm::KeyAlgorithmType,
    signing::SigningServiceType,
};

use super::{did_resolver::WalletDidResolver, CreateWalletRequest};
use crate::{
    model::wallet::key_name,
    service::error::ServiceError,
    test_utilities::{TestContext, HOLDER_BPN},
};

const HOLDER_DID: &str = "did:web:localhost%3A8080:BPNL000000000001";

#[tokio::test]
async fn test_create_local_wallet() {
    let context = TestContext::new();

    let wallet = context.wallet(HOLDER_BPN).await;

    assert_eq!(HOLDER_DID, wallet.did.as_str());
    assert_eq!(KeyAlgorithmType::Eddsa, wallet.algorithm);
    assert_eq!(SigningServiceType::Local, wallet.signing_service_type);
    assert_eq!(2, wallet.keys.len());
    assert_eq!(
        Some(format!("{HOLDER_BPN}-es256")),
        wallet
            .key_reference(KeyAlgorithmType::Es256)
            .map(|key| key.key_name)
    );

    let document = &wallet.did_document;
    assert_eq!(wallet.did, document.id);
    assert_eq!(2, document.verification_method.len());
    let default_method = &document.verification_method[0];
    assert_eq!(format!("{HOLDER_DID}#{HOLDER_BPN}-eddsa"), default_method.id);
    assert_eq!(JSON_WEB_KEY_2020, default_method.r#type);
    assert!(default_method.public_key_jwk.is_some());
    assert_eq!(document.authentication, document.assertion_method);
    assert_eq!(2, document.assertion_method.as_ref().unwrap().len());
}

#[tokio::test]
async fn test_create_wallet_rejects_duplicate_bpn() {
    let context = TestContext::new();
    context.wallet(HOLDER_BPN).await;

    let result = context
        .miw
        .wallet_service
        .create_wallet(CreateWalletRequest::local(HOLDER_BPN, "again"))
        .await;

    assert!(matches!(result, Err(ServiceError::Validation(_))));
}

#[tokio::test]
async fn test_create_wallet_rejects_empty_bpn() {
    let context = TestContext::new();

    let result = context
        .miw
        .wallet_service
        .create_wallet(CreateWalletRequest::local(" ", "blank"))
        .await;

    assert!(matches!(result, Err(ServiceError::Validation(_))));
}

#[tokio::test]
async fn test_create_remote_wallet_with_external_keys() {
    let context = TestContext::new();
    let bpn = Bpn::from(HOLDER_BPN);

    let wallet = context
        .miw
        .wallet_service
        .create_wallet(CreateWalletRequest {
            signing_service_type: SigningServiceType::Remote,
            external_keys: vec![WalletKey {
                key_name: key_name(&bpn, KeyAlgorithmType::Eddsa),
                algorithm: KeyAlgorithmType::Eddsa,
                public_key: vec![7; 32],
            }],
            ..CreateWalletRequest::local(bpn.to_owned(), "remote")
        })
        .await
        .unwrap();

    assert_eq!(SigningServiceType::Remote, wallet.signing_service_type);
    assert_eq!(1, wallet.did_document.verification_method.len());
}

#[tokio::test]
async fn test_create_remote_wallet_without_default_key_fails() {
    let context = TestContext::new();

    let result = context
        .miw
        .wallet_service
        .create_wallet(CreateWalletRequest {
            algorithm: KeyAlgorithmType::Es256,
            signing_service_type: SigningServiceType::Remote,
            external_keys: vec![WalletKey {
                key_name: "eddsa-only".to_string(),
                algorithm: KeyAlgorithmType::Eddsa,
                public_key: vec![7; 32],
            }],
            ..CreateWalletRequest::local(HOLDER_BPN, "remote")
        })
        .await;

    assert!(matches!(result, Err(ServiceError::Validation(_))));
}

#[tokio::test]
async fn test_get_wallet_by_bpn_or_did() {
    let context = TestContext::new();
    let created = context.wallet(HOLDER_BPN).await;
    let service = &context.miw.wallet_service;

    assert_eq!(created, service.get_wallet(HOLDER_BPN).await.unwrap());
    assert_eq!(created, service.get_wallet(HOLDER_DID).await.unwrap());
    assert_eq!(
        created.did_document,
        service.get_did_document(HOLDER_BPN).await.unwrap()
    );

    assert!(matches!(
        service.get_wallet("BPNL000000000009").await,
        Err(ServiceError::NotFound { .. })
    ));
}

#[tokio::test]
async fn test_authority_wallet_is_created_once() {
    let context = TestContext::new();

    let first = context.authority().await;
    let second = context.authority().await;

    assert_eq!(first, second);
    assert_eq!(context.config.authority_bpn, first.bpn);
}

#[tokio::test]
async fn test_did_resolver_prefers_hosted_wallets() {
    let context = TestContext::new();
    let wallet = context.wallet(HOLDER_BPN).await;

    let foreign = DidValue::from("did:web:example.com:BPNL000000000042");
    let foreign_document = serde_json::from_value(serde_json::json!({
        "@context": [],
        "id": foreign
    }))
    .unwrap();

    let mut fallback = MockDidResolver::new();
    fallback
        .expect_resolve()
        .with(eq(foreign.to_owned()))
        .times(1)
        .return_once(move |_| Ok(foreign_document));

    let resolver = WalletDidResolver::new(context.wallets.clone(), Arc::new(fallback));

    assert_eq!(
        wallet.did_document,
        resolver.resolve(&wallet.did).await.unwrap()
    );
    assert_eq!(foreign, resolver.resolve(&foreign).await.unwrap().id);
}
