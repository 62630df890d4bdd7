//! The **Managed Identity Wallet** engine issues, stores, aggregates and revokes
//! verifiable credentials on behalf of organizations identified by a business
//! partner number (BPN) and a `did:web` identifier.
//!
//! ## Repository structure
//!
//! * **Crypto** (`miw-crypto`): signers, hashers and key derivation.
//! * **Providers** (`miw-providers`): key algorithms, key storage, signing services,
//!   credential formatting, DID resolution and the status-list codecs.
//! * **Core** (this crate): the services orchestrating the providers and the
//!   persistence contracts they rely on.
//!
//! ## Getting started
//!
//! ```ignore rust
//! let wallet = ManagedIdentityWallet::in_memory(MiwConfig::default())?;
//!
//! wallet
//!     .wallet_service
//!     .get_or_create_authority_wallet("Operator")
//!     .await?;
//! let holder = wallet
//!     .wallet_service
//!     .create_wallet(CreateWalletRequest::local("BPNL000000000001", "Holder"))
//!     .await?;
//!
//! wallet
//!     .credential_service
//!     .issue_membership_credential(&config.authority_bpn, holder.did.as_str())
//!     .await?;
//! ```

use std::{collections::HashMap, sync::Arc};

use miw_crypto::imp::{hasher::sha256::SHA256, CryptoProviderImpl};
use miw_providers::{
    credential_formatter::imp::json_ld::{canonicalizer::JcsCanonicalizer, LdProofFormatter},
    did::imp::web::{Params as WebDidResolverParams, WebDidResolver},
    http_client::{imp::reqwest_client::ReqwestClient, HttpClient},
    key_algorithm::imp::provider::KeyAlgorithmProviderImpl,
    key_storage::imp::{
        in_memory::InMemoryKeyStore,
        internal::{EncryptedKeyStore, InternalKeyProvider},
    },
    signing::{
        imp::{local::LocalSigningService, remote::RemoteSigningService},
        provider::SigningServiceProviderImpl,
        SigningService, SigningServiceType,
    },
    util::key_verification::KeyVerification,
};

use config::MiwConfig;
use repository::{
    in_memory::{
        InMemoryCredentialRepository, InMemoryStatusListRepository, InMemoryWalletRepository,
    },
    CredentialRepository, StatusListRepository, WalletRepository,
};
use service::{
    credential::CredentialService,
    error::ServiceError,
    revocation::RevocationService,
    wallet::{did_resolver::WalletDidResolver, WalletService},
};

pub mod config;
pub mod model;
pub mod repository;
pub mod service;

#[cfg(test)]
mod test_utilities;

/// The persistence back-ends the engine writes to.
#[derive(Clone)]
pub struct Repositories {
    pub wallet: Arc<dyn WalletRepository>,
    pub credential: Arc<dyn CredentialRepository>,
    pub status_list: Arc<dyn StatusListRepository>,
}

impl Repositories {
    pub fn in_memory() -> Self {
        Self {
            wallet: Arc::new(InMemoryWalletRepository::default()),
            credential: Arc::new(InMemoryCredentialRepository::default()),
            status_list: Arc::new(InMemoryStatusListRepository::default()),
        }
    }
}

pub struct ManagedIdentityWallet {
    pub wallet_service: WalletService,
    pub credential_service: CredentialService,
    pub revocation_service: Arc<RevocationService>,
}

impl ManagedIdentityWallet {
    pub fn new(
        config: MiwConfig,
        repositories: Repositories,
        key_store: Arc<dyn EncryptedKeyStore>,
        client: Arc<dyn HttpClient>,
    ) -> Result<Self, ServiceError> {
        let config = Arc::new(config);

        let crypto_provider = Arc::new(CryptoProviderImpl::default());
        let key_algorithm_provider =
            Arc::new(KeyAlgorithmProviderImpl::with_default_algorithms(crypto_provider));

        let key_provider = Arc::new(InternalKeyProvider::new(
            key_algorithm_provider.clone(),
            key_store,
            config.key_encryption.to_owned(),
        ));

        let mut signing_services: HashMap<SigningServiceType, Arc<dyn SigningService>> =
            HashMap::new();
        signing_services.insert(
            SigningServiceType::Local,
            Arc::new(
                LocalSigningService::builder()
                    .key_provider(key_provider.clone())
                    .key_algorithm_provider(key_algorithm_provider.clone())
                    .build()?,
            ),
        );
        if let Some(params) = &config.remote_signing {
            signing_services.insert(
                SigningServiceType::Remote,
                Arc::new(RemoteSigningService::new(client.clone(), params.to_owned())),
            );
        }
        let signing_service_provider = Arc::new(SigningServiceProviderImpl::new(signing_services));

        let did_resolver = Arc::new(WalletDidResolver::new(
            repositories.wallet.clone(),
            Arc::new(WebDidResolver::new(
                client.clone(),
                WebDidResolverParams {
                    resolve_to_insecure_http: config.resolve_did_web_insecure,
                },
            )),
        ));
        let verifier = Arc::new(KeyVerification {
            did_resolver,
            key_algorithm_provider: key_algorithm_provider.clone(),
        });
        let ld_formatter = Arc::new(LdProofFormatter::new(
            Arc::new(SHA256 {}),
            Arc::new(JcsCanonicalizer),
        ));

        let revocation_service = Arc::new(RevocationService::new(
            config.clone(),
            repositories.status_list.clone(),
            repositories.wallet.clone(),
            signing_service_provider.clone(),
            ld_formatter.clone(),
            verifier.clone(),
            client,
        ));

        Ok(Self {
            wallet_service: WalletService::new(
                config.clone(),
                repositories.wallet.clone(),
                key_provider,
                key_algorithm_provider,
            ),
            credential_service: CredentialService::new(
                config,
                repositories.wallet,
                repositories.credential,
                signing_service_provider,
                revocation_service.clone(),
                ld_formatter,
                verifier,
            ),
            revocation_service,
        })
    }

    /// Everything kept in process memory; foreign DIDs and status lists are
    /// fetched over HTTP.
    pub fn in_memory(config: MiwConfig) -> Result<Self, ServiceError> {
        Self::new(
            config,
            Repositories::in_memory(),
            Arc::new(InMemoryKeyStore::default()),
            Arc::new(ReqwestClient::default()),
        )
    }
}
