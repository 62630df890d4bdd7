use std::{sync::Arc, time::Duration};

use serde_json::json;
use wiremock::{
    matchers::{body_partial_json, header, method, path},
    Mock, MockServer, ResponseTemplate,
};

use super::{Params, RemoteSigningService};
use crate::{
    common_models::credential::{SignedCredential, VerifiableCredential},
    credential_formatter::model::CredentialEncoding,
    http_client::{self, imp::reqwest_client::ReqwestClient},
    key_algorithm::KeyAlgorithmType,
    signing::{error::SigningServiceError, KeyReference, SigningService},
};

fn params(server: &MockServer, token: Option<&str>) -> Params {
    Params {
        url: format!("{}/signer", server.uri()).parse().unwrap(),
        token: token.map(ToOwned::to_owned),
        timeout_secs: None,
    }
}

fn service(server: &MockServer, token: Option<&str>) -> RemoteSigningService {
    RemoteSigningService::new(Arc::new(ReqwestClient::default()), params(server, token))
}

fn eddsa_key() -> KeyReference {
    KeyReference {
        key_name: "BPNL000000000000-eddsa".to_string(),
        algorithm: KeyAlgorithmType::Eddsa,
    }
}

fn status_list() -> VerifiableCredential {
    serde_json::from_value(json!({
        "@context": ["https://www.w3.org/2018/credentials/v1"],
        "id": "http://localhost/api/v1/revocations/credentials/BPNL000000000000/revocation/1",
        "type": ["VerifiableCredential", "BitstringStatusListCredential"],
        "issuer": "did:web:localhost:BPNL000000000000",
        "issuanceDate": "2024-05-01T10:00:00Z",
        "credentialSubject": {
            "id": "http://localhost/api/v1/revocations/credentials/BPNL000000000000/revocation/1#list",
            "type": "BitstringStatusList",
            "statusPurpose": "revocation",
            "encodedList": "H4sIAAAAAAAA"
        }
    }))
    .unwrap()
}

fn signed(document: &VerifiableCredential) -> serde_json::Value {
    let mut value = serde_json::to_value(document).unwrap();
    value["proof"] = json!({
        "type": "DataIntegrityProof",
        "cryptosuite": "eddsa-jcs-2022",
        "created": "2024-05-01T10:00:01Z",
        "verificationMethod": "did:web:localhost:BPNL000000000000#BPNL000000000000-eddsa",
        "proofPurpose": "assertionMethod",
        "proofValue": "z3FXQjecWufY46yg5abdVZsXqLhxhueuSoZgNSARiKBk"
    });
    value
}

#[tokio::test]
async fn test_sign_status_list_with_call_token() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/signer/sign"))
        .and(header("Authorization", "Bearer call-token"))
        .and(body_partial_json(json!({
            "kind": "statusList",
            "keyName": "BPNL000000000000-eddsa",
            "algorithm": "EDDSA",
            "encoding": "JSON_LD"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "document": signed(&status_list())
        })))
        .expect(1)
        .mount(&server)
        .await;

    let result = service(&server, Some("static-token"))
        .sign_status_list(status_list(), &eddsa_key(), Some("call-token".to_string()))
        .await
        .unwrap();

    assert_eq!(
        "did:web:localhost:BPNL000000000000#BPNL000000000000-eddsa",
        result.proof.unwrap().verification_method
    );
}

#[tokio::test]
async fn test_sign_status_list_non_success_status() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/signer/sign"))
        .respond_with(ResponseTemplate::new(503).set_body_string("signer unavailable"))
        .mount(&server)
        .await;

    let result = service(&server, Some("token"))
        .sign_status_list(status_list(), &eddsa_key(), None)
        .await;

    assert!(matches!(
        result,
        Err(SigningServiceError::Remote { status: 503, message }) if message == "signer unavailable"
    ));
}

#[tokio::test]
async fn test_sign_without_token() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let result = service(&server, None)
        .sign_status_list(status_list(), &eddsa_key(), None)
        .await;

    assert!(matches!(result, Err(SigningServiceError::MissingToken)));
}

#[tokio::test]
async fn test_sign_credential_jwt() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/signer/sign"))
        .and(header("Authorization", "Bearer static-token"))
        .and(body_partial_json(json!({
            "kind": "credential",
            "algorithm": "ES256",
            "encoding": "JWT"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "jwt": "eyJhbGciOiJFUzI1NiJ9.eyJ2YyI6e319.c2lnbmF0dXJl"
        })))
        .mount(&server)
        .await;

    let key = KeyReference {
        key_name: "BPNL000000000000-es256".to_string(),
        algorithm: KeyAlgorithmType::Es256,
    };
    let result = service(&server, Some("static-token"))
        .sign_credential(status_list(), &key, CredentialEncoding::Jwt)
        .await
        .unwrap();

    assert!(matches!(
        result,
        SignedCredential::Jwt { ref token, .. } if token.ends_with(".c2lnbmF0dXJl")
    ));
    assert_eq!(&status_list(), result.credential());
}

#[tokio::test]
async fn test_sign_credential_rejects_unsigned_document() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/signer/sign"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "document": status_list()
        })))
        .mount(&server)
        .await;

    let result = service(&server, Some("token"))
        .sign_credential(status_list(), &eddsa_key(), CredentialEncoding::JsonLd)
        .await;

    assert!(matches!(result, Err(SigningServiceError::InvalidResponse(_))));
}

#[tokio::test]
async fn test_unsupported_pairing_is_rejected_before_request() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let key = KeyReference {
        key_name: "BPNL000000000000-es256".to_string(),
        algorithm: KeyAlgorithmType::Es256,
    };
    let result = service(&server, Some("token"))
        .sign_status_list(status_list(), &key, None)
        .await;

    assert!(matches!(
        result,
        Err(SigningServiceError::UnsupportedConfiguration { .. })
    ));
}

#[tokio::test]
async fn test_hung_signer_times_out() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(3)))
        .mount(&server)
        .await;

    let service = RemoteSigningService::new(
        Arc::new(ReqwestClient::default()),
        Params {
            timeout_secs: Some(1),
            ..params(&server, Some("token"))
        },
    );
    let result = service
        .sign_status_list(status_list(), &eddsa_key(), None)
        .await;

    assert!(matches!(
        result,
        Err(SigningServiceError::Transport(http_client::Error::Timeout))
    ));
}
