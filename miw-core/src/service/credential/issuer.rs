use std::sync::Arc;

use itertools::Itertools;
use time::OffsetDateTime;
use uuid::Uuid;

use miw_providers::{
    common_models::{
        credential::{
            VerifiableCredential, CREDENTIALS_V1_CONTEXT, DATA_INTEGRITY_CONTEXT,
            VERIFIABLE_CREDENTIAL_TYPE,
        },
        now_utc,
    },
    credential_formatter::model::CredentialEncoding,
    revocation::model::StatusPurpose,
    signing::{ensure_supported, provider::SigningServiceProvider},
};

use crate::{
    model::{
        credential::{CredentialCreationConfig, LedgerEntry, Supersede},
        wallet::Wallet,
    },
    repository::{CredentialRepository, WalletRepository},
    service::{error::ServiceError, revocation::RevocationService},
};

/// Signs credentials and records them on both ledgers.
pub struct CredentialIssuer {
    wallet_repository: Arc<dyn WalletRepository>,
    credential_repository: Arc<dyn CredentialRepository>,
    signing_service_provider: Arc<dyn SigningServiceProvider>,
    revocation_service: Arc<RevocationService>,
}

impl CredentialIssuer {
    pub fn new(
        wallet_repository: Arc<dyn WalletRepository>,
        credential_repository: Arc<dyn CredentialRepository>,
        signing_service_provider: Arc<dyn SigningServiceProvider>,
        revocation_service: Arc<RevocationService>,
    ) -> Self {
        Self {
            wallet_repository,
            credential_repository,
            signing_service_provider,
            revocation_service,
        }
    }

    /// Issues the credential described by `config`.
    ///
    /// The holder and issuer ledger rows are written in one unit of work. `token`
    /// only matters when a revocable credential needs a new status list signed
    /// remotely.
    pub async fn issue(
        &self,
        config: CredentialCreationConfig,
        token: Option<String>,
    ) -> Result<LedgerEntry, ServiceError> {
        self.issue_superseding(config, Supersede::Nothing, token).await
    }

    /// Like [`Self::issue`], additionally replacing the holder's current entry of the
    /// same type in the same unit of work. Fails with `Conflict` if that entry is no
    /// longer the expected one.
    #[tracing::instrument(
        level = "debug",
        skip(self, config, token),
        fields(issuer = %config.issuer_did_document.id, holder = %config.holder_did)
    )]
    pub(crate) async fn issue_superseding(
        &self,
        config: CredentialCreationConfig,
        supersede: Supersede,
        token: Option<String>,
    ) -> Result<LedgerEntry, ServiceError> {
        let issuer = self
            .wallet_repository
            .get_wallet_by_did(&config.issuer_did_document.id)
            .await?
            .ok_or_else(|| {
                ServiceError::not_found("issuer wallet", &config.issuer_did_document.id)
            })?;
        let holder = self
            .wallet_repository
            .get_wallet_by_did(&config.holder_did)
            .await?
            .ok_or_else(|| ServiceError::not_found("holder wallet", &config.holder_did))?;

        ensure_supported(config.key.algorithm, config.encoding)?;
        if !owns_key(&issuer, &config) {
            return Err(ServiceError::AccessDenied(format!(
                "key `{}` does not belong to `{}`",
                config.key.key_name, issuer.did
            )));
        }
        let signing_service = self
            .signing_service_provider
            .get_signing_service(issuer.signing_service_type)?;

        let mut credential = unsigned_credential(&config, &issuer)?;
        if config.revocable {
            let entry = self
                .revocation_service
                .allocate(&issuer, StatusPurpose::Revocation, token)
                .await?;
            credential.credential_status = Some(entry);
        }

        let signed = signing_service
            .sign_credential(credential, &config.key, config.encoding)
            .await?;

        let credential = signed.credential();
        let entry = LedgerEntry {
            credential_id: credential.id.to_owned().unwrap_or_default(),
            holder_did: holder.did,
            self_issued: holder.bpn == issuer.bpn,
            holder_bpn: holder.bpn,
            issuer_did: issuer.did,
            issuer_bpn: issuer.bpn,
            r#type: credential
                .primary_type()
                .unwrap_or(VERIFIABLE_CREDENTIAL_TYPE)
                .to_owned(),
            credential: credential.to_owned(),
            jwt: signed.jwt().map(ToOwned::to_owned),
            stored: config.stored,
            created_at: OffsetDateTime::now_utc(),
        };

        self.credential_repository
            .insert_issued(entry.clone(), supersede)
            .await?;
        tracing::info!(
            credential_id = %entry.credential_id,
            kind = %entry.r#type,
            encoding = %config.encoding,
            "issued credential"
        );

        Ok(entry)
    }
}

fn owns_key(issuer: &Wallet, config: &CredentialCreationConfig) -> bool {
    issuer
        .keys
        .iter()
        .any(|key| key.key_name == config.key.key_name && key.algorithm == config.key.algorithm)
}

fn unsigned_credential(
    config: &CredentialCreationConfig,
    issuer: &Wallet,
) -> Result<VerifiableCredential, ServiceError> {
    let mut context: Vec<String> = std::iter::once(CREDENTIALS_V1_CONTEXT.to_owned())
        .chain(config.contexts.iter().cloned())
        .unique()
        .collect();
    if config.encoding == CredentialEncoding::JsonLd
        && !context.iter().any(|c| c == DATA_INTEGRITY_CONTEXT)
    {
        context.push(DATA_INTEGRITY_CONTEXT.to_owned());
    }

    let r#type = std::iter::once(VERIFIABLE_CREDENTIAL_TYPE.to_owned())
        .chain(config.types.iter().cloned())
        .unique()
        .collect();

    Ok(VerifiableCredential {
        context,
        id: Some(format!("urn:uuid:{}", Uuid::new_v4())),
        r#type,
        issuer: issuer.did.to_owned(),
        issuance_date: now_utc(),
        expiration_date: config.expiration_date,
        credential_subject: vec![config.subject.to_owned().into_map()?],
        credential_status: None,
        proof: None,
    })
}

#[cfg(test)]
mod test {
    use serde_json::json;

    use miw_providers::{
        common_models::{did::DidValue, subject::TypedSubject},
        key_algorithm::KeyAlgorithmType,
        signing::KeyReference,
    };

    use super::*;

    fn config(encoding: CredentialEncoding) -> CredentialCreationConfig {
        let subject = match json!({ "id": "did:web:localhost:BPNL000000000001" }) {
            serde_json::Value::Object(map) => map,
            _ => unreachable!(),
        };

        CredentialCreationConfig::builder()
            .holder_did(DidValue::from("did:web:localhost:BPNL000000000001"))
            .issuer_did_document(
                serde_json::from_value(json!({
                    "@context": [],
                    "id": "did:web:localhost:BPNL000000000000"
                }))
                .unwrap(),
            )
            .key(KeyReference {
                key_name: "BPNL000000000000-eddsa".to_string(),
                algorithm: KeyAlgorithmType::Eddsa,
            })
            .contexts([
                CREDENTIALS_V1_CONTEXT,
                "https://example.com/ctx",
                "https://example.com/ctx",
            ])
            .types([
                VERIFIABLE_CREDENTIAL_TYPE,
                "CustomCredential",
                "CustomCredential",
            ])
            .subject(TypedSubject::Generic(subject))
            .encoding(encoding)
            .build()
            .unwrap()
    }

    fn issuer() -> Wallet {
        Wallet {
            bpn: "BPNL000000000000".into(),
            name: "issuer".to_string(),
            did: DidValue::from("did:web:localhost:BPNL000000000000"),
            did_document: config(CredentialEncoding::Jwt).issuer_did_document,
            signing_service_type: miw_providers::signing::SigningServiceType::Local,
            algorithm: KeyAlgorithmType::Eddsa,
            keys: vec![],
            created_at: OffsetDateTime::now_utc(),
        }
    }

    #[test]
    fn test_unsigned_credential_dedups_and_orders_contexts_and_types() {
        let credential =
            unsigned_credential(&config(CredentialEncoding::JsonLd), &issuer()).unwrap();

        assert_eq!(
            vec![
                CREDENTIALS_V1_CONTEXT,
                "https://example.com/ctx",
                DATA_INTEGRITY_CONTEXT
            ],
            credential.context
        );
        assert_eq!(
            vec![VERIFIABLE_CREDENTIAL_TYPE, "CustomCredential"],
            credential.r#type
        );
        assert!(credential.id.unwrap().starts_with("urn:uuid:"));
        assert!(credential.proof.is_none());
    }

    #[test]
    fn test_jwt_credentials_get_no_proof_context() {
        let credential = unsigned_credential(&config(CredentialEncoding::Jwt), &issuer()).unwrap();

        assert!(!credential.context.iter().any(|c| c == DATA_INTEGRITY_CONTEXT));
    }
}
