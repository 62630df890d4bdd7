//! Participant onboarding: wallets, their keys and their `did:web` documents.

use std::sync::Arc;

use serde_json::json;
use time::OffsetDateTime;

use miw_providers::{
    common_models::{
        did::{Bpn, DidValue},
        key::WalletKey,
    },
    did::{
        imp::web::WebDidResolver,
        model::{
            DidDocument, DidVerificationMethod, DID_CONTEXT, JSON_WEB_KEY_2020, JWS_2020_CONTEXT,
        },
    },
    key_algorithm::{provider::KeyAlgorithmProvider, KeyAlgorithmType},
    key_storage::imp::internal::InternalKeyProvider,
    signing::{error::SigningServiceError, SigningServiceType},
};

use crate::{
    config::MiwConfig,
    model::wallet::{key_name, Wallet},
    repository::WalletRepository,
    service::error::ServiceError,
};

pub mod did_resolver;

#[cfg(test)]
mod test;

#[derive(Clone, Debug)]
pub struct CreateWalletRequest {
    pub bpn: Bpn,
    pub name: String,
    pub algorithm: KeyAlgorithmType,
    pub signing_service_type: SigningServiceType,
    /// Public keys of a wallet whose private keys live with the remote signer.
    /// Ignored for local wallets, whose keys are generated here.
    pub external_keys: Vec<WalletKey>,
}

impl CreateWalletRequest {
    pub fn local(bpn: impl Into<Bpn>, name: impl Into<String>) -> Self {
        Self {
            bpn: bpn.into(),
            name: name.into(),
            algorithm: KeyAlgorithmType::Eddsa,
            signing_service_type: SigningServiceType::Local,
            external_keys: vec![],
        }
    }
}

pub struct WalletService {
    config: Arc<MiwConfig>,
    wallet_repository: Arc<dyn WalletRepository>,
    key_provider: Arc<InternalKeyProvider>,
    key_algorithm_provider: Arc<dyn KeyAlgorithmProvider>,
}

impl WalletService {
    pub fn new(
        config: Arc<MiwConfig>,
        wallet_repository: Arc<dyn WalletRepository>,
        key_provider: Arc<InternalKeyProvider>,
        key_algorithm_provider: Arc<dyn KeyAlgorithmProvider>,
    ) -> Self {
        Self {
            config,
            wallet_repository,
            key_provider,
            key_algorithm_provider,
        }
    }

    /// Creates the wallet, with an EdDSA and an ES256 key for local wallets.
    #[tracing::instrument(level = "debug", skip(self, request), fields(bpn = %request.bpn))]
    pub async fn create_wallet(
        &self,
        request: CreateWalletRequest,
    ) -> Result<Wallet, ServiceError> {
        if request.bpn.as_str().trim().is_empty() {
            return Err(ServiceError::Validation("BPN must not be empty".to_owned()));
        }
        if self
            .wallet_repository
            .get_wallet_by_bpn(&request.bpn)
            .await?
            .is_some()
        {
            return Err(ServiceError::Validation(format!(
                "wallet for `{}` already exists",
                request.bpn
            )));
        }

        let did = WebDidResolver::did_for(&self.config.base_url, &request.bpn)
            .map_err(|e| ServiceError::Validation(e.to_string()))?;

        let keys = match request.signing_service_type {
            SigningServiceType::Local => {
                let mut keys = vec![];
                for algorithm in [KeyAlgorithmType::Eddsa, KeyAlgorithmType::Es256] {
                    let key = self
                        .key_provider
                        .generate_key(&did, &key_name(&request.bpn, algorithm), algorithm)
                        .await
                        .map_err(SigningServiceError::from)?;
                    keys.push(key);
                }
                keys
            }
            SigningServiceType::Remote => request.external_keys,
        };

        if !keys.iter().any(|key| key.algorithm == request.algorithm) {
            return Err(ServiceError::Validation(format!(
                "wallet has no {} key for its default algorithm",
                request.algorithm
            )));
        }

        let did_document = self.did_document(&did, request.algorithm, &keys)?;
        let wallet = Wallet {
            bpn: request.bpn,
            name: request.name,
            did,
            did_document,
            signing_service_type: request.signing_service_type,
            algorithm: request.algorithm,
            keys,
            created_at: OffsetDateTime::now_utc(),
        };

        self.wallet_repository.create_wallet(wallet.clone()).await?;
        tracing::info!(did = %wallet.did, "created wallet");

        Ok(wallet)
    }

    /// Returns the operator wallet, creating it on first use.
    pub async fn get_or_create_authority_wallet(&self, name: &str) -> Result<Wallet, ServiceError> {
        let bpn = &self.config.authority_bpn;
        match self.wallet_repository.get_wallet_by_bpn(bpn).await? {
            Some(wallet) => Ok(wallet),
            None => {
                self.create_wallet(CreateWalletRequest::local(bpn.to_owned(), name))
                    .await
            }
        }
    }

    /// Looks a wallet up by DID or by BPN.
    pub async fn get_wallet(&self, identifier: &str) -> Result<Wallet, ServiceError> {
        find_wallet(self.wallet_repository.as_ref(), identifier).await
    }

    pub async fn get_did_document(&self, identifier: &str) -> Result<DidDocument, ServiceError> {
        Ok(self.get_wallet(identifier).await?.did_document)
    }

    fn did_document(
        &self,
        did: &DidValue,
        default_algorithm: KeyAlgorithmType,
        keys: &[WalletKey],
    ) -> Result<DidDocument, ServiceError> {
        let mut keys: Vec<&WalletKey> = keys.iter().collect();
        keys.sort_by_key(|key| key.algorithm != default_algorithm);

        let verification_method = keys
            .into_iter()
            .map(|key| {
                let jwk = self
                    .key_algorithm_provider
                    .get_key_algorithm(key.algorithm)
                    .ok_or_else(|| {
                        ServiceError::UnsupportedConfiguration(format!(
                            "missing key algorithm {}",
                            key.algorithm
                        ))
                    })?
                    .bytes_to_jwk(&key.public_key)
                    .map_err(|e| ServiceError::Validation(e.to_string()))?;

                Ok(DidVerificationMethod {
                    id: format!("{did}#{}", key.key_name),
                    r#type: JSON_WEB_KEY_2020.to_owned(),
                    controller: did.to_string(),
                    public_key_jwk: Some(jwk),
                })
            })
            .collect::<Result<Vec<_>, ServiceError>>()?;

        let ids: Vec<String> = verification_method
            .iter()
            .map(|method| method.id.to_owned())
            .collect();

        Ok(DidDocument {
            context: json!([DID_CONTEXT, JWS_2020_CONTEXT]),
            id: did.to_owned(),
            verification_method,
            authentication: Some(ids.clone()),
            assertion_method: Some(ids),
        })
    }
}

pub(crate) async fn find_wallet(
    wallet_repository: &dyn WalletRepository,
    identifier: &str,
) -> Result<Wallet, ServiceError> {
    let wallet = if identifier.starts_with("did:") {
        wallet_repository
            .get_wallet_by_did(&DidValue::from(identifier))
            .await?
    } else {
        wallet_repository
            .get_wallet_by_bpn(&Bpn::from(identifier))
            .await?
    };

    wallet.ok_or_else(|| ServiceError::not_found("wallet", identifier))
}
