//! Signing delegated to an external signer that holds the wallet keys.

use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use serde::Deserialize;
use url::Url;

use self::{
    dto::{RemoteSignRequestRestDTO, RemoteSignResponseRestDTO, SignatureKindRestEnum},
    mapper::{signed_document, signed_token},
};
use crate::{
    common_models::credential::{
        SignedCredential, SignedPresentation, VerifiableCredential, VerifiablePresentation,
    },
    credential_formatter::model::CredentialEncoding,
    http_client::HttpClient,
    signing::{ensure_supported, error::SigningServiceError, KeyReference, SigningService},
};

mod dto;
mod mapper;

#[cfg(test)]
mod test;

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Params {
    pub url: Url,
    /// Used when a call does not bring its own token.
    #[serde(default)]
    pub token: Option<String>,
    /// Upper bound for one signing round trip.
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

pub struct RemoteSigningService {
    client: Arc<dyn HttpClient>,
    params: Params,
}

impl RemoteSigningService {
    pub fn new(client: Arc<dyn HttpClient>, params: Params) -> Self {
        Self { client, params }
    }

    async fn sign(
        &self,
        request: RemoteSignRequestRestDTO<'_>,
        token: Option<String>,
    ) -> Result<RemoteSignResponseRestDTO, SigningServiceError> {
        let token = token
            .or_else(|| self.params.token.clone())
            .ok_or(SigningServiceError::MissingToken)?;
        let url = format!("{}/sign", self.params.url.as_str().trim_end_matches('/'));

        tracing::debug!(
            kind = ?request.kind,
            key = request.key_name,
            "requesting remote signature"
        );

        let response = self
            .client
            .post(&url)
            .bearer_auth(&token)
            .timeout(self.params.timeout_secs.map(Duration::from_secs))
            .json(&request)?
            .send()
            .await?;

        if !response.status.is_success() {
            return Err(SigningServiceError::Remote {
                status: response.status.0,
                message: response.text(),
            });
        }

        Ok(response.json()?)
    }
}

#[async_trait]
impl SigningService for RemoteSigningService {
    async fn sign_credential(
        &self,
        credential: VerifiableCredential,
        key: &KeyReference,
        encoding: CredentialEncoding,
    ) -> Result<SignedCredential, SigningServiceError> {
        ensure_supported(key.algorithm, encoding)?;

        let response = self
            .sign(
                RemoteSignRequestRestDTO {
                    kind: SignatureKindRestEnum::Credential,
                    key_name: &key.key_name,
                    algorithm: key.algorithm,
                    encoding,
                    challenge: None,
                    document: serde_json::to_value(&credential)?,
                },
                None,
            )
            .await?;

        match encoding {
            CredentialEncoding::JsonLd => {
                signed_document(response).map(SignedCredential::LinkedData)
            }
            CredentialEncoding::Jwt => Ok(SignedCredential::Jwt {
                token: signed_token(response)?,
                credential,
            }),
        }
    }

    async fn sign_presentation(
        &self,
        presentation: VerifiablePresentation,
        key: &KeyReference,
        encoding: CredentialEncoding,
        challenge: Option<String>,
    ) -> Result<SignedPresentation, SigningServiceError> {
        ensure_supported(key.algorithm, encoding)?;

        let response = self
            .sign(
                RemoteSignRequestRestDTO {
                    kind: SignatureKindRestEnum::Presentation,
                    key_name: &key.key_name,
                    algorithm: key.algorithm,
                    encoding,
                    challenge,
                    document: serde_json::to_value(&presentation)?,
                },
                None,
            )
            .await?;

        match encoding {
            CredentialEncoding::JsonLd => {
                signed_document(response).map(SignedPresentation::LinkedData)
            }
            CredentialEncoding::Jwt => Ok(SignedPresentation::Jwt {
                token: signed_token(response)?,
                presentation,
            }),
        }
    }

    async fn sign_status_list(
        &self,
        mut credential: VerifiableCredential,
        key: &KeyReference,
        token: Option<String>,
    ) -> Result<VerifiableCredential, SigningServiceError> {
        ensure_supported(key.algorithm, CredentialEncoding::JsonLd)?;
        credential.proof = None;

        let response = self
            .sign(
                RemoteSignRequestRestDTO {
                    kind: SignatureKindRestEnum::StatusList,
                    key_name: &key.key_name,
                    algorithm: key.algorithm,
                    encoding: CredentialEncoding::JsonLd,
                    challenge: None,
                    document: serde_json::to_value(&credential)?,
                },
                token,
            )
            .await?;

        signed_document(response)
    }
}
