use std::sync::Arc;

use miw_providers::{
    http_client::{imp::reqwest_client::ReqwestClient, HttpClient},
    key_storage::imp::{in_memory::InMemoryKeyStore, internal::Params as KeyEncryptionParams},
};

use crate::{
    config::MiwConfig,
    model::wallet::Wallet,
    repository::in_memory::{
        InMemoryCredentialRepository, InMemoryStatusListRepository, InMemoryWalletRepository,
    },
    service::wallet::CreateWalletRequest,
    ManagedIdentityWallet, Repositories,
};

pub const HOLDER_BPN: &str = "BPNL000000000001";
pub const OTHER_HOLDER_BPN: &str = "BPNL000000000002";

pub fn test_config() -> MiwConfig {
    MiwConfig {
        status_list_capacity: 16,
        key_encryption: KeyEncryptionParams {
            encryption: Some("passphrase".to_string()),
            salt: "test-salt".to_string(),
            rounds: 1,
        },
        ..Default::default()
    }
}

/// The full in-memory stack with direct access to the repositories behind it.
pub struct TestContext {
    pub config: MiwConfig,
    pub miw: ManagedIdentityWallet,
    pub wallets: Arc<InMemoryWalletRepository>,
    pub credentials: Arc<InMemoryCredentialRepository>,
    pub status_lists: Arc<InMemoryStatusListRepository>,
}

impl TestContext {
    pub fn new() -> Self {
        Self::with_config(test_config(), Arc::new(ReqwestClient::default()))
    }

    pub fn with_config(config: MiwConfig, client: Arc<dyn HttpClient>) -> Self {
        let wallets = Arc::new(InMemoryWalletRepository::default());
        let credentials = Arc::new(InMemoryCredentialRepository::default());
        let status_lists = Arc::new(InMemoryStatusListRepository::default());

        let miw = ManagedIdentityWallet::new(
            config.clone(),
            Repositories {
                wallet: wallets.clone(),
                credential: credentials.clone(),
                status_list: status_lists.clone(),
            },
            Arc::new(InMemoryKeyStore::default()),
            client,
        )
        .unwrap();

        Self {
            config,
            miw,
            wallets,
            credentials,
            status_lists,
        }
    }

    pub async fn authority(&self) -> Wallet {
        self.miw
            .wallet_service
            .get_or_create_authority_wallet("Operator")
            .await
            .unwrap()
    }

    pub async fn wallet(&self, bpn: &str) -> Wallet {
        self.miw
            .wallet_service
            .create_wallet(CreateWalletRequest::local(bpn, format!("Wallet {bpn}")))
            .await
            .unwrap()
    }
}
