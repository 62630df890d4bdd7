use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::Mutex;

use miw_providers::common_models::did::{Bpn, DidValue};

use crate::{
    model::wallet::Wallet,
    repository::{error::DataLayerError, WalletRepository},
};

#[derive(Default)]
pub struct InMemoryWalletRepository {
    wallets: Mutex<HashMap<Bpn, Wallet>>,
}

#[async_trait]
impl WalletRepository for InMemoryWalletRepository {
    async fn create_wallet(&self, wallet: Wallet) -> Result<(), DataLayerError> {
        let mut wallets = self.wallets.lock().await;

        if wallets.contains_key(&wallet.bpn) || wallets.values().any(|w| w.did == wallet.did) {
            return Err(DataLayerError::AlreadyExists);
        }

        wallets.insert(wallet.bpn.to_owned(), wallet);
        Ok(())
    }

    async fn get_wallet_by_bpn(&self, bpn: &Bpn) -> Result<Option<Wallet>, DataLayerError> {
        Ok(self.wallets.lock().await.get(bpn).cloned())
    }

    async fn get_wallet_by_did(&self, did: &DidValue) -> Result<Option<Wallet>, DataLayerError> {
        Ok(self
            .wallets
            .lock()
            .await
            .values()
            .find(|wallet| &wallet.did == did)
            .cloned())
    }
}
