#![allow(dead_code)]

use std::sync::{Arc, Once};

use miw_core::{
    config::MiwConfig,
    model::wallet::Wallet,
    repository::in_memory::{
        InMemoryCredentialRepository, InMemoryStatusListRepository, InMemoryWalletRepository,
    },
    service::wallet::CreateWalletRequest,
    ManagedIdentityWallet, Repositories,
};
use miw_providers::{
    http_client::imp::reqwest_client::ReqwestClient,
    key_storage::imp::{in_memory::InMemoryKeyStore, internal::Params as KeyEncryptionParams},
};
use tracing_subscriber::EnvFilter;

pub const HOLDER_BPN: &str = "BPNL000000000001";
pub const STATUS_LIST_CAPACITY: usize = 16;

static TRACING: Once = Once::new();

/// Logs to the test output; `RUST_LOG` selects what.
pub fn init_tracer() {
    TRACING.call_once(|| {
        tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::from_default_env())
            .with_test_writer()
            .init();
    });
}

fn engine(
    config: &MiwConfig,
    repositories: &Repositories,
    key_store: &Arc<InMemoryKeyStore>,
) -> Arc<ManagedIdentityWallet> {
    let miw = ManagedIdentityWallet::new(
        config.clone(),
        repositories.clone(),
        key_store.clone(),
        Arc::new(ReqwestClient::default()),
    )
    .unwrap();
    Arc::new(miw)
}

pub struct Harness {
    pub config: MiwConfig,
    pub miw: Arc<ManagedIdentityWallet>,
    pub credentials: Arc<InMemoryCredentialRepository>,
    pub status_lists: Arc<InMemoryStatusListRepository>,
    repositories: Repositories,
    key_store: Arc<InMemoryKeyStore>,
}

impl Harness {
    pub fn new() -> Self {
        init_tracer();

        let config = MiwConfig {
            status_list_capacity: STATUS_LIST_CAPACITY,
            key_encryption: KeyEncryptionParams {
                encryption: Some("integration".to_string()),
                salt: "integration-salt".to_string(),
                rounds: 1,
            },
            ..Default::default()
        };

        let credentials = Arc::new(InMemoryCredentialRepository::default());
        let status_lists = Arc::new(InMemoryStatusListRepository::default());
        let repositories = Repositories {
            wallet: Arc::new(InMemoryWalletRepository::default()),
            credential: credentials.clone(),
            status_list: status_lists.clone(),
        };
        let key_store = Arc::new(InMemoryKeyStore::default());
        let miw = engine(&config, &repositories, &key_store);

        Self {
            config,
            miw,
            credentials,
            status_lists,
            repositories,
            key_store,
        }
    }

    /// Another engine instance over the same storage, like a second replica of the service.
    pub fn replica(&self) -> Arc<ManagedIdentityWallet> {
        engine(&self.config, &self.repositories, &self.key_store)
    }

    pub async fn onboard(&self, bpn: &str) -> Wallet {
        self.miw
            .wallet_service
            .create_wallet(CreateWalletRequest::local(bpn, format!("Company {bpn}")))
            .await
            .unwrap()
    }

    pub async fn authority(&self) -> Wallet {
        self.miw
            .wallet_service
            .get_or_create_authority_wallet("Operator")
            .await
            .unwrap()
    }
}
