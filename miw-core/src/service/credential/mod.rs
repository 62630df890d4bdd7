//! Issuance, querying, validation and presentation of credentials.
//!
//! Every non-summary issuance goes through [`CredentialService`], which checks
//! authorization and uniqueness, delegates to the [`CredentialIssuer`] and then
//! refreshes the holder's summary through the [`SummaryAggregator`].

use std::sync::Arc;

use serde_json::Value;
use time::{Duration, OffsetDateTime};
use uuid::Uuid;

use miw_providers::{
    common_models::{
        credential::{
            SignedPresentation, VerifiablePresentation, BPN_CREDENTIAL_TYPE,
            BUSINESS_PARTNER_CONTEXT, CREDENTIALS_V1_CONTEXT, DISMANTLER_CREDENTIAL_TYPE,
            FRAMEWORK_CREDENTIAL_TYPE, MEMBERSHIP_CREDENTIAL_TYPE, STATUS_LIST_CREDENTIAL_TYPE,
            SUMMARY_CREDENTIAL_TYPE, VERIFIABLE_CREDENTIAL_TYPE, VERIFIABLE_PRESENTATION_TYPE,
        },
        did::Bpn,
        now_utc,
        subject::{BpnSubject, DismantlerSubject, FrameworkSubject, MembershipSubject, TypedSubject},
    },
    credential_formatter::{
        imp::json_ld::LdProofFormatter,
        model::{CredentialEncoding, TokenVerifier},
    },
    key_algorithm::KeyAlgorithmType,
    revocation::model::CredentialRevocationState,
    signing::{provider::SigningServiceProvider, KeyReference},
};

use self::{
    dto::{IssueCredentialRequest, ValidationResult},
    issuer::CredentialIssuer,
    summary::SummaryAggregator,
    validator::Presented,
};
use crate::{
    config::MiwConfig,
    model::{
        credential::{CredentialCreationConfig, LedgerEntry},
        list_query::{CredentialQuery, GetListResponse},
        wallet::Wallet,
    },
    repository::{CredentialRepository, WalletRepository},
    service::{error::ServiceError, revocation::RevocationService, wallet::find_wallet},
};

pub mod dto;
pub mod issuer;
pub mod summary;
mod validator;


pub struct CredentialService {
    config: Arc<MiwConfig>,
    wallet_repository: Arc<dyn WalletRepository>,
    credential_repository: Arc<dyn CredentialRepository>,
    signing_service_provider: Arc<dyn SigningServiceProvider>,
    revocation_service: Arc<RevocationService>,
    issuer: Arc<CredentialIssuer>,
    summary: SummaryAggregator,
    ld_formatter: Arc<LdProofFormatter>,
    verifier: Arc<dyn TokenVerifier>,
}

/// What is about to be issued, before keys and encoding are settled.
struct Issuance {
    contexts: Vec<String>,
    types: Vec<String>,
    subject: TypedSubject,
    algorithm: KeyAlgorithmType,
    encoding: Option<CredentialEncoding>,
    expiration_date: Option<OffsetDateTime>,
    revocable: bool,
    token: Option<String>,
}

impl CredentialService {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        config: Arc<MiwConfig>,
        wallet_repository: Arc<dyn WalletRepository>,
        credential_repository: Arc<dyn CredentialRepository>,
        signing_service_provider: Arc<dyn SigningServiceProvider>,
        revocation_service: Arc<RevocationService>,
        ld_formatter: Arc<LdProofFormatter>,
        verifier: Arc<dyn TokenVerifier>,
    ) -> Self {
        let issuer = Arc::new(CredentialIssuer::new(
            wallet_repository.clone(),
            credential_repository.clone(),
            signing_service_provider.clone(),
            revocation_service.clone(),
        ));
        let summary = SummaryAggregator::new(
            config.clone(),
            wallet_repository.clone(),
            credential_repository.clone(),
            issuer.clone(),
        );

        Self {
            config,
            wallet_repository,
            credential_repository,
            signing_service_provider,
            revocation_service,
            issuer,
            summary,
            ld_formatter,
            verifier,
        }
    }

    pub async fn issue_bpn_credential(
        &self,
        caller_bpn: &Bpn,
        holder: &str,
    ) -> Result<LedgerEntry, ServiceError> {
        let authority = self.authority_wallet(caller_bpn).await?;
        let holder = self.wallet(holder).await?;

        let subject = TypedSubject::Bpn(BpnSubject {
            id: holder.did.to_string(),
            bpn: holder.bpn.to_string(),
        });
        let issuance = self.authority_issuance(
            &authority,
            BPN_CREDENTIAL_TYPE,
            vec![BUSINESS_PARTNER_CONTEXT.to_owned()],
            subject,
        );

        self.issue_and_summarize(&authority, &holder, issuance).await
    }

    pub async fn issue_membership_credential(
        &self,
        caller_bpn: &Bpn,
        holder: &str,
    ) -> Result<LedgerEntry, ServiceError> {
        let authority = self.authority_wallet(caller_bpn).await?;
        let holder = self.wallet(holder).await?;

        let subject = TypedSubject::Membership(MembershipSubject {
            id: holder.did.to_string(),
            holder_identifier: holder.bpn.to_string(),
            member_of: self.config.member_of.to_owned(),
        });
        let issuance = self.authority_issuance(
            &authority,
            MEMBERSHIP_CREDENTIAL_TYPE,
            vec![BUSINESS_PARTNER_CONTEXT.to_owned()],
            subject,
        );

        self.issue_and_summarize(&authority, &holder, issuance).await
    }

    pub async fn issue_dismantler_credential(
        &self,
        caller_bpn: &Bpn,
        holder: &str,
        activity_type: &str,
        allowed_vehicle_brands: Option<Vec<String>>,
    ) -> Result<LedgerEntry, ServiceError> {
        let authority = self.authority_wallet(caller_bpn).await?;
        let holder = self.wallet(holder).await?;

        let subject = TypedSubject::Dismantler(DismantlerSubject {
            id: holder.did.to_string(),
            holder_identifier: holder.bpn.to_string(),
            activity_type: activity_type.to_owned(),
            allowed_vehicle_brands,
        });
        let issuance = self.authority_issuance(
            &authority,
            DISMANTLER_CREDENTIAL_TYPE,
            vec![BUSINESS_PARTNER_CONTEXT.to_owned()],
            subject,
        );

        self.issue_and_summarize(&authority, &holder, issuance).await
    }

    pub async fn issue_framework_credential(
        &self,
        caller_bpn: &Bpn,
        holder: &str,
        framework_type: &str,
        contract_template: &str,
        contract_version: &str,
    ) -> Result<LedgerEntry, ServiceError> {
        if framework_type.trim().is_empty() {
            return Err(ServiceError::Validation(
                "framework type must not be empty".to_owned(),
            ));
        }

        let authority = self.authority_wallet(caller_bpn).await?;
        let holder = self.wallet(holder).await?;

        let subject = TypedSubject::Framework(FrameworkSubject {
            id: holder.did.to_string(),
            holder_identifier: holder.bpn.to_string(),
            use_case_type: framework_type.to_owned(),
            contract_template: contract_template.to_owned(),
            contract_version: contract_version.to_owned(),
        });
        let issuance = self.authority_issuance(
            &authority,
            FRAMEWORK_CREDENTIAL_TYPE,
            vec![BUSINESS_PARTNER_CONTEXT.to_owned()],
            subject,
        );

        self.issue_and_summarize(&authority, &holder, issuance).await
    }

    /// Issues an arbitrary credential from the caller's own wallet.
    pub async fn issue_credential(
        &self,
        caller_bpn: &Bpn,
        request: IssueCredentialRequest,
    ) -> Result<LedgerEntry, ServiceError> {
        if !request
            .types
            .iter()
            .any(|r#type| r#type != VERIFIABLE_CREDENTIAL_TYPE)
        {
            return Err(ServiceError::Validation(
                "a credential type besides the base type is required".to_owned(),
            ));
        }
        if let Some(reserved) = request.types.iter().find(|r#type| {
            r#type.as_str() == SUMMARY_CREDENTIAL_TYPE
                || r#type.as_str() == STATUS_LIST_CREDENTIAL_TYPE
        }) {
            return Err(ServiceError::Validation(format!(
                "`{reserved}` credentials are issued by the wallet itself"
            )));
        }

        let issuer = self.wallet(caller_bpn.as_str()).await?;
        let holder = self.wallet(&request.holder).await?;

        let subject = TypedSubject::parse(&request.types, &request.subject)?;
        let issuance = Issuance {
            contexts: request.contexts,
            types: request.types,
            subject,
            algorithm: request.algorithm.unwrap_or(issuer.algorithm),
            encoding: request.encoding,
            expiration_date: request.expiration_date,
            revocable: request.revocable,
            token: request.token,
        };

        self.issue_and_summarize(&issuer, &holder, issuance).await
    }

    /// Credentials held by the caller.
    pub async fn get_credentials(
        &self,
        caller_bpn: &Bpn,
        query: CredentialQuery,
    ) -> Result<GetListResponse<LedgerEntry>, ServiceError> {
        let wallet = self.wallet(caller_bpn.as_str()).await?;

        Ok(self
            .credential_repository
            .get_holder_credentials(CredentialQuery {
                holder: Some(wallet.did),
                ..query
            })
            .await?)
    }

    /// Credentials issued by the caller, including superseded summaries.
    pub async fn get_issued_credentials(
        &self,
        caller_bpn: &Bpn,
        query: CredentialQuery,
    ) -> Result<GetListResponse<LedgerEntry>, ServiceError> {
        let wallet = self.wallet(caller_bpn.as_str()).await?;

        Ok(self
            .credential_repository
            .get_issued_credentials(CredentialQuery {
                issuer: Some(wallet.did),
                ..query
            })
            .await?)
    }

    /// Checks a presented credential.
    ///
    /// An invalid signature is reported, not raised. The revocation check of a
    /// credential with a valid signature fails closed: a status list that cannot be
    /// trusted is an error.
    #[tracing::instrument(level = "debug", skip(self, presented))]
    pub async fn validate_credential(
        &self,
        presented: &Value,
        with_credential_expiry_date: bool,
        with_revocation: bool,
    ) -> Result<ValidationResult, ServiceError> {
        let presented = Presented::from_value(presented)?;
        let credential = presented.credential()?;

        let signature_valid = presented
            .verify_signature(&self.ld_formatter, self.verifier.as_ref())
            .await;
        let expired =
            with_credential_expiry_date && credential.is_expired_at(OffsetDateTime::now_utc());

        let revoked = match (&credential.credential_status, with_revocation && signature_valid) {
            (Some(entry), true) => {
                self.revocation_service.get_credential_status(entry).await?
                    != CredentialRevocationState::Active
            }
            _ => false,
        };

        Ok(ValidationResult {
            valid: signature_valid && !expired && !revoked,
            signature_valid,
            expired,
            revoked,
            credential,
        })
    }

    /// Revokes a credential the caller has issued.
    pub async fn revoke_credential(
        &self,
        caller_bpn: &Bpn,
        credential_id: &str,
        token: Option<String>,
    ) -> Result<(), ServiceError> {
        let wallet = self.wallet(caller_bpn.as_str()).await?;
        let entry = self
            .credential_repository
            .get_issued_credentials(CredentialQuery {
                issuer: Some(wallet.did),
                credential_id: Some(credential_id.to_owned()),
                ..Default::default()
            })
            .await?
            .values
            .into_iter()
            .next()
            .ok_or_else(|| ServiceError::not_found("credential", credential_id))?;

        let status = entry.credential.credential_status.ok_or_else(|| {
            ServiceError::Validation(format!("credential `{credential_id}` is not revocable"))
        })?;

        self.revocation_service
            .revoke(caller_bpn, &status, token)
            .await
    }

    /// Wraps held credentials into a presentation signed by the caller.
    #[tracing::instrument(level = "debug", skip(self, challenge))]
    pub async fn create_presentation(
        &self,
        caller_bpn: &Bpn,
        credential_ids: &[String],
        encoding: CredentialEncoding,
        challenge: Option<String>,
    ) -> Result<SignedPresentation, ServiceError> {
        if credential_ids.is_empty() {
            return Err(ServiceError::Validation(
                "at least one credential is required".to_owned(),
            ));
        }

        let holder = self.wallet(caller_bpn.as_str()).await?;
        let now = OffsetDateTime::now_utc();

        let mut verifiable_credential = vec![];
        for credential_id in credential_ids {
            let entry = self
                .credential_repository
                .get_holder_credentials(CredentialQuery {
                    holder: Some(holder.did.to_owned()),
                    credential_id: Some(credential_id.to_owned()),
                    ..Default::default()
                })
                .await?
                .values
                .into_iter()
                .next()
                .ok_or_else(|| ServiceError::not_found("credential", credential_id))?;

            if entry.credential.is_expired_at(now) {
                return Err(ServiceError::Expired(credential_id.to_owned()));
            }

            verifiable_credential.push(match entry.jwt {
                Some(token) => Value::String(token),
                None => serde_json::to_value(&entry.credential)
                    .map_err(|e| ServiceError::Validation(e.to_string()))?,
            });
        }

        let key = presentation_key(&holder, encoding)?;
        let presentation = VerifiablePresentation {
            context: vec![CREDENTIALS_V1_CONTEXT.to_owned()],
            id: Some(format!("urn:uuid:{}", Uuid::new_v4())),
            r#type: vec![VERIFIABLE_PRESENTATION_TYPE.to_owned()],
            holder: Some(holder.did.to_owned()),
            verifiable_credential,
            proof: None,
        };

        Ok(self
            .signing_service_provider
            .get_signing_service(holder.signing_service_type)?
            .sign_presentation(presentation, &key, encoding, challenge)
            .await?)
    }

    async fn issue_and_summarize(
        &self,
        issuer: &Wallet,
        holder: &Wallet,
        issuance: Issuance,
    ) -> Result<LedgerEntry, ServiceError> {
        self.ensure_not_held(issuer, holder, &issuance.subject).await?;

        let key = issuer.key_reference(issuance.algorithm).ok_or_else(|| {
            ServiceError::UnsupportedConfiguration(format!(
                "wallet `{}` has no {} key",
                issuer.bpn, issuance.algorithm
            ))
        })?;
        let encoding = issuance
            .encoding
            .unwrap_or_else(|| preferred_encoding(issuance.algorithm));
        let summary_item = summary_item(&issuance.subject, &issuance.types);

        let config = CredentialCreationConfig::builder()
            .holder_did(holder.did.to_owned())
            .issuer_did_document(issuer.did_document.to_owned())
            .key(key)
            .contexts(issuance.contexts)
            .types(issuance.types)
            .subject(issuance.subject)
            .expiration_date(Some(issuance.expiration_date.unwrap_or_else(|| {
                now_utc() + Duration::days(self.config.vc_expiry_days)
            })))
            .encoding(encoding)
            .revocable(issuance.revocable)
            .build()?;

        let entry = self.issuer.issue(config, issuance.token).await?;

        if let Some(item) = summary_item {
            self.summary.update(&issuer.did, &holder.did, &item).await?;
        }

        Ok(entry)
    }

    /// Rejects a second credential of a kind a holder may hold only once per issuer.
    async fn ensure_not_held(
        &self,
        issuer: &Wallet,
        holder: &Wallet,
        subject: &TypedSubject,
    ) -> Result<(), ServiceError> {
        let r#type = match subject {
            TypedSubject::Bpn(_) => BPN_CREDENTIAL_TYPE,
            TypedSubject::Membership(_) => MEMBERSHIP_CREDENTIAL_TYPE,
            TypedSubject::Dismantler(_) => DISMANTLER_CREDENTIAL_TYPE,
            TypedSubject::Framework(_) => FRAMEWORK_CREDENTIAL_TYPE,
            _ => return Ok(()),
        };

        let mut query = CredentialQuery {
            holder: Some(holder.did.to_owned()),
            issuer: Some(issuer.did.to_owned()),
            types: vec![r#type.to_owned()],
            page_size: CredentialQuery::MAX_PAGE_SIZE,
            ..Default::default()
        };
        let duplicate = loop {
            let held = self
                .credential_repository
                .get_holder_credentials(query.clone())
                .await?;

            let found = held.values.iter().any(|entry| match subject {
                TypedSubject::Framework(framework) => {
                    TypedSubject::from_credential(&entry.credential).is_ok_and(|held| {
                        held.framework_type() == Some(framework.use_case_type.as_str())
                    })
                }
                _ => true,
            });
            query.page += 1;
            if found || query.page >= held.total_pages {
                break found;
            }
        };

        if duplicate {
            let r#type = subject.framework_type().unwrap_or(r#type).to_owned();
            tracing::warn!(holder = %holder.bpn, kind = %r#type, "duplicate credential rejected");
            return Err(ServiceError::DuplicateCredential {
                r#type,
                holder: holder.bpn.to_string(),
            });
        }

        Ok(())
    }

    /// Loads the authority wallet on behalf of `caller_bpn`, which must be the authority.
    async fn authority_wallet(&self, caller_bpn: &Bpn) -> Result<Wallet, ServiceError> {
        if caller_bpn != &self.config.authority_bpn {
            tracing::warn!(%caller_bpn, "caller is not the issuing authority");
            return Err(ServiceError::AccessDenied(format!(
                "`{caller_bpn}` may not issue this credential"
            )));
        }

        self.wallet(caller_bpn.as_str()).await
    }

    fn authority_issuance(
        &self,
        authority: &Wallet,
        r#type: &str,
        contexts: Vec<String>,
        subject: TypedSubject,
    ) -> Issuance {
        Issuance {
            contexts,
            types: vec![VERIFIABLE_CREDENTIAL_TYPE.to_owned(), r#type.to_owned()],
            subject,
            algorithm: authority.algorithm,
            encoding: None,
            expiration_date: None,
            revocable: true,
            token: None,
        }
    }

    async fn wallet(&self, identifier: &str) -> Result<Wallet, ServiceError> {
        find_wallet(self.wallet_repository.as_ref(), identifier).await
    }
}

fn preferred_encoding(algorithm: KeyAlgorithmType) -> CredentialEncoding {
    if algorithm.supports(CredentialEncoding::JsonLd) {
        CredentialEncoding::JsonLd
    } else {
        CredentialEncoding::Jwt
    }
}

/// Framework credentials are summarized by their use case, everything else by type.
fn summary_item(subject: &TypedSubject, types: &[String]) -> Option<String> {
    subject.framework_type().map(ToOwned::to_owned).or_else(|| {
        types
            .iter()
            .rev()
            .find(|r#type| *r#type != VERIFIABLE_CREDENTIAL_TYPE)
            .cloned()
    })
}

/// The holder's default key if it can sign `encoding`, any capable key otherwise.
fn presentation_key(
    holder: &Wallet,
    encoding: CredentialEncoding,
) -> Result<KeyReference, ServiceError> {
    std::iter::once(holder.algorithm)
        .chain([KeyAlgorithmType::Eddsa, KeyAlgorithmType::Es256])
        .filter(|algorithm| algorithm.supports(encoding))
        .find_map(|algorithm| holder.key_reference(algorithm))
        .ok_or_else(|| {
            ServiceError::UnsupportedConfiguration(format!(
                "wallet `{}` has no key able to sign {encoding} presentations",
                holder.bpn
            ))
        })
}
