//! Persistence contracts of the engine.
//!
//! Implementations must honour the atomicity stated on each operation; the engine
//! relies on it instead of holding its own locks.

use async_trait::async_trait;

use miw_providers::{
    common_models::{
        credential::VerifiableCredential,
        did::{Bpn, DidValue},
    },
    revocation::model::StatusPurpose,
};

use self::error::DataLayerError;
use crate::model::{
    credential::{LedgerEntry, Supersede},
    list_query::{CredentialQuery, GetListResponse},
    status_list::{StatusListCredential, StatusListIndex},
    wallet::Wallet,
};

pub mod error;
pub mod in_memory;

#[cfg_attr(any(test, feature = "mock"), mockall::automock)]
#[async_trait]
pub trait WalletRepository: Send + Sync {
    /// Fails with `AlreadyExists` if the BPN or DID is taken.
    async fn create_wallet(&self, wallet: Wallet) -> Result<(), DataLayerError>;

    async fn get_wallet_by_bpn(&self, bpn: &Bpn) -> Result<Option<Wallet>, DataLayerError>;

    async fn get_wallet_by_did(&self, did: &DidValue) -> Result<Option<Wallet>, DataLayerError>;
}

#[cfg_attr(any(test, feature = "mock"), mockall::automock)]
#[async_trait]
pub trait CredentialRepository: Send + Sync {
    /// Writes `entry` to the holder and the issuer ledger in one unit of work.
    ///
    /// With [`Supersede::Current`] the holder's entry of the same issuer, holder and type
    /// is removed in the same unit of work; its issuer ledger copy stays. That entry must
    /// still be the expected one, otherwise `Conflict` is returned and nothing is written.
    /// `AlreadyExists` is returned if the credential id is present on either ledger.
    async fn insert_issued(
        &self,
        entry: LedgerEntry,
        supersede: Supersede,
    ) -> Result<(), DataLayerError>;

    async fn get_holder_credentials(
        &self,
        query: CredentialQuery,
    ) -> Result<GetListResponse<LedgerEntry>, DataLayerError>;

    async fn get_issued_credentials(
        &self,
        query: CredentialQuery,
    ) -> Result<GetListResponse<LedgerEntry>, DataLayerError>;

    /// Latest issuer ledger entry of `type` issued by `issuer` to `holder`.
    async fn get_latest_issued(
        &self,
        issuer: &DidValue,
        holder: &DidValue,
        r#type: &str,
    ) -> Result<Option<LedgerEntry>, DataLayerError>;
}

#[cfg_attr(any(test, feature = "mock"), mockall::automock)]
#[async_trait]
pub trait StatusListRepository: Send + Sync {
    /// All generations of the list, ordered by list number.
    async fn get_indices(
        &self,
        bpn: &Bpn,
        purpose: StatusPurpose,
    ) -> Result<Vec<StatusListIndex>, DataLayerError>;

    /// Stores a new generation; `AlreadyExists` if its list number is taken.
    async fn create_list(
        &self,
        credential: StatusListCredential,
        index: StatusListIndex,
    ) -> Result<(), DataLayerError>;

    /// Atomically hands out the next index of the generation, `None` once it is full.
    async fn increment_index(
        &self,
        id: &str,
        capacity: usize,
    ) -> Result<Option<usize>, DataLayerError>;

    async fn get_credential(&self, id: &str)
        -> Result<Option<StatusListCredential>, DataLayerError>;

    /// Replaces the credential if it is still at `expected_revision`, `Conflict` otherwise.
    async fn update_credential(
        &self,
        id: &str,
        credential: VerifiableCredential,
        expected_revision: u64,
    ) -> Result<(), DataLayerError>;
}
