//! Status lists of the wallets hosted here: index allocation, revocation and
//! status verification.

use std::sync::Arc;

use miw_providers::{
    common_models::{credential::VerifiableCredential, did::Bpn, now_utc},
    credential_formatter::{imp::json_ld::LdProofFormatter, model::TokenVerifier},
    http_client::HttpClient,
    key_algorithm::KeyAlgorithmType,
    revocation::{
        bitstring,
        locator::{list_id, StatusListLocator, StatusLocator},
        model::{CredentialRevocationState, StatusEntry, StatusPurpose},
        status_list::{build_status_list_credential, extract_status_list, replace_encoded_list},
    },
    signing::{provider::SigningServiceProvider, KeyReference},
};

use crate::{
    config::MiwConfig,
    model::{
        status_list::{StatusListCredential, StatusListIndex},
        wallet::Wallet,
    },
    repository::{error::DataLayerError, StatusListRepository, WalletRepository},
    service::error::ServiceError,
};


/// Every failed attempt means another caller filled a generation or created the next
/// one, so this only bounds pathological contention.
const MAX_ALLOCATION_ATTEMPTS: usize = 100;
const MAX_UPDATE_ATTEMPTS: usize = 10;

pub struct RevocationService {
    config: Arc<MiwConfig>,
    status_list_repository: Arc<dyn StatusListRepository>,
    wallet_repository: Arc<dyn WalletRepository>,
    signing_service_provider: Arc<dyn SigningServiceProvider>,
    ld_formatter: Arc<LdProofFormatter>,
    verifier: Arc<dyn TokenVerifier>,
    client: Arc<dyn HttpClient>,
}

impl RevocationService {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        config: Arc<MiwConfig>,
        status_list_repository: Arc<dyn StatusListRepository>,
        wallet_repository: Arc<dyn WalletRepository>,
        signing_service_provider: Arc<dyn SigningServiceProvider>,
        ld_formatter: Arc<LdProofFormatter>,
        verifier: Arc<dyn TokenVerifier>,
        client: Arc<dyn HttpClient>,
    ) -> Self {
        Self {
            config,
            status_list_repository,
            wallet_repository,
            signing_service_provider,
            ld_formatter,
            verifier,
            client,
        }
    }

    /// Hands out a fresh status entry in the newest generation with room left,
    /// creating the next generation once all are full.
    ///
    /// Indices are taken with a conditional increment, so concurrent callers never
    /// share one; two callers racing to create the same generation are resolved by
    /// the repository rejecting the second list.
    #[tracing::instrument(level = "debug", skip(self, issuer, token), fields(bpn = %issuer.bpn))]
    pub async fn allocate(
        &self,
        issuer: &Wallet,
        purpose: StatusPurpose,
        token: Option<String>,
    ) -> Result<StatusEntry, ServiceError> {
        let capacity = self.config.status_list_capacity;

        for _ in 0..MAX_ALLOCATION_ATTEMPTS {
            let indices = self
                .status_list_repository
                .get_indices(&issuer.bpn, purpose)
                .await?;

            if let Some(open) = indices.iter().find(|index| index.has_capacity(capacity)) {
                match self
                    .status_list_repository
                    .increment_index(&open.id, capacity)
                    .await?
                {
                    Some(index) => {
                        tracing::debug!(list = %open.id, index, "allocated status index");
                        return Ok(self
                            .locator(open.bpn.to_owned(), purpose, open.list_number)
                            .at(index)
                            .to_entry());
                    }
                    None => continue,
                }
            }

            let list_number = indices.last().map_or(1, |index| index.list_number + 1);
            match self
                .create_list(issuer, purpose, list_number, token.clone())
                .await
            {
                Ok(()) | Err(ServiceError::Persistence(DataLayerError::AlreadyExists)) => {}
                Err(error) => return Err(error),
            }
        }

        Err(ServiceError::RevocationFailure(format!(
            "no status index could be allocated for `{}` after {MAX_ALLOCATION_ATTEMPTS} attempts",
            issuer.bpn
        )))
    }

    /// Sets the bit of `entry` and re-signs its list.
    #[tracing::instrument(level = "debug", skip(self, entry, token), fields(entry = %entry.id))]
    pub async fn revoke(
        &self,
        caller_bpn: &Bpn,
        entry: &StatusEntry,
        token: Option<String>,
    ) -> Result<(), ServiceError> {
        let locator =
            StatusLocator::parse_entry(entry).map_err(|e| ServiceError::Validation(e.to_string()))?;

        if &locator.list.bpn != caller_bpn {
            tracing::warn!(
                %caller_bpn,
                owner = %locator.list.bpn,
                "revocation of foreign entry"
            );
            return Err(ServiceError::AccessDenied(format!(
                "`{caller_bpn}` cannot revoke entries of `{}`",
                locator.list.bpn
            )));
        }
        if !self.is_local(&locator.list) {
            return Err(ServiceError::Validation(format!(
                "status list `{}` is not hosted by this wallet",
                locator.list.list_url()
            )));
        }

        let issuer = self
            .wallet_repository
            .get_wallet_by_bpn(caller_bpn)
            .await?
            .ok_or_else(|| ServiceError::not_found("wallet", caller_bpn))?;
        let key = status_list_key(&issuer)?;
        let signing_service = self
            .signing_service_provider
            .get_signing_service(issuer.signing_service_type)?;

        let id = locator.list.list_id();
        let max_bits = self.max_list_bits();
        for _ in 0..MAX_UPDATE_ATTEMPTS {
            let stored = self.stored_list(&id).await?;

            let subject = extract_status_list(&stored.credential)
                .map_err(|e| ServiceError::MalformedStatusList(e.to_string()))?;
            let revoked = bitstring::get_bit(&subject.encoded_list, locator.index, max_bits)
                .map_err(|e| ServiceError::RevocationFailure(e.to_string()))?;
            if revoked {
                return Err(ServiceError::Validation(format!(
                    "`{}` is already revoked",
                    entry.id
                )));
            }

            let encoded = bitstring::set_bit(&subject.encoded_list, locator.index, true, max_bits)
                .map_err(|e| ServiceError::RevocationFailure(e.to_string()))?;
            let unsigned = replace_encoded_list(stored.credential, encoded)
                .map_err(|e| ServiceError::RevocationFailure(e.to_string()))?;
            let signed = signing_service
                .sign_status_list(unsigned, &key, token.clone())
                .await
                .map_err(|e| ServiceError::RevocationFailure(e.to_string()))?;

            match self
                .status_list_repository
                .update_credential(&id, signed, stored.revision)
                .await
            {
                Ok(()) => {
                    tracing::info!(list = %id, index = locator.index, "status bit set");
                    return Ok(());
                }
                Err(DataLayerError::Conflict) => {
                    tracing::debug!(list = %id, "status list changed concurrently, retrying");
                }
                Err(error) => return Err(error.into()),
            }
        }

        Err(ServiceError::RevocationFailure(format!(
            "status list `{id}` kept changing during revocation"
        )))
    }

    /// Reads the bit of `entry` from its list, after verifying the list's proof.
    ///
    /// Fails closed: a list whose proof does not verify is never interpreted.
    #[tracing::instrument(level = "debug", skip(self, entry), fields(entry = %entry.id))]
    pub async fn get_credential_status(
        &self,
        entry: &StatusEntry,
    ) -> Result<CredentialRevocationState, ServiceError> {
        let locator =
            StatusLocator::parse_entry(entry).map_err(|e| ServiceError::Validation(e.to_string()))?;

        let credential = if self.is_local(&locator.list) {
            self.stored_list(&locator.list.list_id()).await?.credential
        } else {
            self.fetch_list(&locator.list).await?
        };

        let document = serde_json::to_value(&credential)
            .map_err(|e| ServiceError::MalformedStatusList(e.to_string()))?;
        self.ld_formatter
            .verify_proof(&document, self.verifier.as_ref())
            .await
            .map_err(|e| {
                tracing::warn!(
                    list = %locator.list.list_url(),
                    "status list proof rejected: {e}"
                );
                ServiceError::SignatureVerificationFailure(e.to_string())
            })?;

        if credential.id.as_deref() != Some(locator.list.list_url().as_str()) {
            return Err(ServiceError::MalformedStatusList(format!(
                "credential id {:?} does not match `{}`",
                credential.id,
                locator.list.list_url()
            )));
        }

        let subject = extract_status_list(&credential)
            .map_err(|e| ServiceError::MalformedStatusList(e.to_string()))?;
        if subject.status_purpose != locator.list.purpose {
            return Err(ServiceError::MalformedStatusList(format!(
                "list purpose `{}` does not match entry purpose `{}`",
                subject.status_purpose, locator.list.purpose
            )));
        }

        let bit = bitstring::get_bit(&subject.encoded_list, locator.index, self.max_list_bits())
            .map_err(|e| ServiceError::MalformedStatusList(e.to_string()))?;

        Ok(CredentialRevocationState::from_bit(locator.list.purpose, bit))
    }

    /// The signed list served under its list URL.
    pub async fn get_status_list_credential(
        &self,
        bpn: &Bpn,
        purpose: StatusPurpose,
        list_number: u32,
    ) -> Result<VerifiableCredential, ServiceError> {
        Ok(self
            .stored_list(&list_id(bpn, purpose, list_number))
            .await?
            .credential)
    }

    async fn create_list(
        &self,
        issuer: &Wallet,
        purpose: StatusPurpose,
        list_number: u32,
        token: Option<String>,
    ) -> Result<(), ServiceError> {
        let key = status_list_key(issuer)?;
        let locator = self.locator(issuer.bpn.to_owned(), purpose, list_number);
        let now = now_utc();

        let encoded = bitstring::generate_empty(self.config.status_list_capacity)
            .map_err(|e| ServiceError::UnsupportedConfiguration(e.to_string()))?;
        let unsigned =
            build_status_list_credential(issuer.did.to_owned(), &locator, encoded, now)
                .map_err(|e| ServiceError::MalformedStatusList(e.to_string()))?;

        let credential = self
            .signing_service_provider
            .get_signing_service(issuer.signing_service_type)?
            .sign_status_list(unsigned, &key, token)
            .await?;

        self.status_list_repository
            .create_list(
                StatusListCredential {
                    id: locator.list_id(),
                    bpn: issuer.bpn.to_owned(),
                    purpose,
                    list_number,
                    credential,
                    revision: 0,
                    created_at: now,
                    modified_at: now,
                },
                StatusListIndex {
                    id: locator.list_id(),
                    bpn: issuer.bpn.to_owned(),
                    purpose,
                    list_number,
                    current_index: -1,
                    created_at: now,
                },
            )
            .await?;

        tracing::info!(list = %locator.list_id(), "created status list generation");
        Ok(())
    }

    async fn stored_list(&self, id: &str) -> Result<StatusListCredential, ServiceError> {
        self.status_list_repository
            .get_credential(id)
            .await?
            .ok_or_else(|| ServiceError::not_found("status list", id))
    }

    async fn fetch_list(
        &self,
        list: &StatusListLocator,
    ) -> Result<VerifiableCredential, ServiceError> {
        let url = list.list_url();
        tracing::debug!(%url, "fetching foreign status list");

        self.client
            .get(&url)
            .send()
            .await
            .and_then(|response| response.error_for_status())
            .map_err(|e| ServiceError::RevocationFailure(format!("could not fetch `{url}`: {e}")))?
            .json()
            .map_err(|e| ServiceError::MalformedStatusList(e.to_string()))
    }

    fn locator(&self, bpn: Bpn, purpose: StatusPurpose, list_number: u32) -> StatusListLocator {
        StatusListLocator::new(&self.config.base_url, bpn, purpose, list_number)
    }

    fn max_list_bits(&self) -> usize {
        self.config
            .status_list_capacity
            .max(self.config.max_status_list_capacity)
    }

    fn is_local(&self, list: &StatusListLocator) -> bool {
        list.base_url == self.config.base_url.trim_end_matches('/')
    }
}

/// Status lists are linked-data credentials and need an EdDSA key.
fn status_list_key(issuer: &Wallet) -> Result<KeyReference, ServiceError> {
    issuer
        .key_reference(KeyAlgorithmType::Eddsa)
        .ok_or_else(|| {
            ServiceError::UnsupportedConfiguration(format!(
                "wallet `{}` has no {} key to sign status lists",
                issuer.bpn,
                KeyAlgorithmType::Eddsa
            ))
        })
}
