use std::sync::Arc;

use time::Duration;

use miw_providers::{
    common_models::{
        credential::{
            VerifiableCredential, CREDENTIALS_V1_CONTEXT, SUMMARY_CONTEXT, SUMMARY_CREDENTIAL_TYPE,
            VERIFIABLE_CREDENTIAL_TYPE,
        },
        did::DidValue,
        now_utc,
        subject::{SummarySubject, TypedSubject},
    },
    credential_formatter::model::CredentialEncoding,
};

use super::issuer::CredentialIssuer;
use crate::{
    config::MiwConfig,
    model::{
        credential::{CredentialCreationConfig, Supersede},
        wallet::Wallet,
    },
    repository::{error::DataLayerError, CredentialRepository, WalletRepository},
    service::error::ServiceError,
};

/// Each conflict means another update of the same summary committed in between.
const MAX_UPDATE_ATTEMPTS: usize = 10;

/// Keeps one summary credential per issuer and holder listing every credential
/// type the issuer has issued to the holder.
pub struct SummaryAggregator {
    config: Arc<MiwConfig>,
    wallet_repository: Arc<dyn WalletRepository>,
    credential_repository: Arc<dyn CredentialRepository>,
    issuer: Arc<CredentialIssuer>,
}

impl SummaryAggregator {
    pub fn new(
        config: Arc<MiwConfig>,
        wallet_repository: Arc<dyn WalletRepository>,
        credential_repository: Arc<dyn CredentialRepository>,
        issuer: Arc<CredentialIssuer>,
    ) -> Self {
        Self {
            config,
            wallet_repository,
            credential_repository,
            issuer,
        }
    }

    /// Adds `new_type` to the holder's summary, re-issuing it if the type is new.
    ///
    /// The new summary replaces the one it was built from only if that is still the
    /// holder's summary. Otherwise the update starts over from the latest summary.
    #[tracing::instrument(
        level = "debug",
        skip(self, issuer_did, holder_did),
        fields(issuer = %issuer_did, holder = %holder_did)
    )]
    pub async fn update(
        &self,
        issuer_did: &DidValue,
        holder_did: &DidValue,
        new_type: &str,
    ) -> Result<(), ServiceError> {
        let issuer = self
            .wallet_repository
            .get_wallet_by_did(issuer_did)
            .await?
            .ok_or_else(|| ServiceError::not_found("issuer wallet", issuer_did))?;
        let holder = self
            .wallet_repository
            .get_wallet_by_did(holder_did)
            .await?
            .ok_or_else(|| ServiceError::not_found("holder wallet", holder_did))?;

        for _ in 0..MAX_UPDATE_ATTEMPTS {
            match self.try_update(&issuer, &holder, new_type).await {
                Err(ServiceError::Persistence(DataLayerError::Conflict)) => {
                    tracing::debug!("summary changed concurrently, retrying");
                }
                result => return result,
            }
        }

        Err(ServiceError::Persistence(DataLayerError::Conflict))
    }

    async fn try_update(
        &self,
        issuer: &Wallet,
        holder: &Wallet,
        new_type: &str,
    ) -> Result<(), ServiceError> {
        let previous = self
            .credential_repository
            .get_latest_issued(&issuer.did, &holder.did, SUMMARY_CREDENTIAL_TYPE)
            .await?;

        let mut summary = match &previous {
            Some(previous) => {
                let summary = summary_subject(&previous.credential)?;
                if summary.contains(new_type) {
                    tracing::debug!(new_type, "summary already lists credential type");
                    return Ok(());
                }
                summary
            }
            None => SummarySubject {
                id: holder.did.to_string(),
                holder_identifier: holder.bpn.to_string(),
                items: vec![],
                contract_template: self.config.contract_template_url.to_owned(),
            },
        };
        summary.add_item(new_type);

        let key = issuer.default_key_reference().ok_or_else(|| {
            ServiceError::UnsupportedConfiguration(format!(
                "wallet `{}` has no {} key",
                issuer.bpn, issuer.algorithm
            ))
        })?;
        let encoding = if key.algorithm.supports(CredentialEncoding::JsonLd) {
            CredentialEncoding::JsonLd
        } else {
            CredentialEncoding::Jwt
        };

        let config = CredentialCreationConfig::builder()
            .holder_did(holder.did.to_owned())
            .issuer_did_document(issuer.did_document.to_owned())
            .key(key)
            .contexts([CREDENTIALS_V1_CONTEXT, SUMMARY_CONTEXT])
            .types([VERIFIABLE_CREDENTIAL_TYPE, SUMMARY_CREDENTIAL_TYPE])
            .subject(TypedSubject::Summary(summary))
            .expiration_date(Some(now_utc() + Duration::days(self.config.vc_expiry_days)))
            .encoding(encoding)
            .revocable(false)
            .stored(false)
            .build()?;

        let supersede = Supersede::Current {
            expected: previous.map(|previous| previous.credential_id),
        };
        self.issuer.issue_superseding(config, supersede, None).await?;

        Ok(())
    }
}

/// The single summary subject of `credential`; anything else means the stored
/// summary is corrupt.
fn summary_subject(credential: &VerifiableCredential) -> Result<SummarySubject, ServiceError> {
    let malformed = |reason: String| {
        tracing::warn!(credential_id = ?credential.id, "malformed summary credential: {reason}");
        ServiceError::MalformedSummaryCredential(reason)
    };

    match TypedSubject::from_credential(credential) {
        Ok(TypedSubject::Summary(summary)) => Ok(summary),
        Ok(_) => Err(malformed("subject is not a summary".to_owned())),
        Err(error) => Err(malformed(error.to_string())),
    }
}
