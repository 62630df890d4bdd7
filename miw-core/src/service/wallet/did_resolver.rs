use std::sync::Arc;

use async_trait::async_trait;

use miw_providers::{
    common_models::did::DidValue,
    did::{error::DidResolverError, model::DidDocument, DidResolver},
};

use crate::repository::WalletRepository;

/// Answers for the wallets hosted here from the repository and hands everything
/// else to `fallback`.
pub struct WalletDidResolver {
    wallet_repository: Arc<dyn WalletRepository>,
    fallback: Arc<dyn DidResolver>,
}

impl WalletDidResolver {
    pub fn new(
        wallet_repository: Arc<dyn WalletRepository>,
        fallback: Arc<dyn DidResolver>,
    ) -> Self {
        Self {
            wallet_repository,
            fallback,
        }
    }
}

#[async_trait]
impl DidResolver for WalletDidResolver {
    async fn resolve(&self, did: &DidValue) -> Result<DidDocument, DidResolverError> {
        let wallet = self
            .wallet_repository
            .get_wallet_by_did(did)
            .await
            .map_err(|e| DidResolverError::ResolutionError(e.to_string()))?;

        match wallet {
            Some(wallet) => Ok(wallet.did_document),
            None => self.fallback.resolve(did).await,
        }
    }
}
