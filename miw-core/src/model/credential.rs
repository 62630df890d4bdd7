use time::OffsetDateTime;

use miw_providers::{
    common_models::{
        credential::VerifiableCredential,
        did::{Bpn, DidValue},
        subject::TypedSubject,
    },
    credential_formatter::model::CredentialEncoding,
    did::model::DidDocument,
    signing::KeyReference,
};

use crate::service::error::ServiceError;

/// A credential as kept on either ledger.
///
/// Every issuance writes one row with the same `credential_id` to the holder ledger
/// and one to the issuer ledger.
#[derive(Clone, Debug, PartialEq)]
pub struct LedgerEntry {
    pub credential_id: String,
    pub holder_did: DidValue,
    pub holder_bpn: Bpn,
    pub issuer_did: DidValue,
    pub issuer_bpn: Bpn,
    /// Most specific type of the credential.
    pub r#type: String,
    pub credential: VerifiableCredential,
    pub jwt: Option<String>,
    pub self_issued: bool,
    /// `false` for credentials generated by the wallet itself, like the summary.
    pub stored: bool,
    pub created_at: OffsetDateTime,
}

/// What an issued entry replaces on the holder ledger.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum Supersede {
    #[default]
    Nothing,
    /// The holder's entry of the same issuer and type, which must still be `expected`.
    /// `None` expects the holder to have no such entry yet.
    Current { expected: Option<String> },
}

/// Everything needed to issue a credential; assembled by the caller of the issuer.
#[derive(Clone, Debug)]
pub struct CredentialCreationConfig {
    pub holder_did: DidValue,
    pub issuer_did_document: DidDocument,
    pub key: KeyReference,
    pub contexts: Vec<String>,
    pub types: Vec<String>,
    pub subject: TypedSubject,
    pub expiration_date: Option<OffsetDateTime>,
    pub encoding: CredentialEncoding,
    pub revocable: bool,
    pub stored: bool,
}

impl CredentialCreationConfig {
    pub fn builder() -> CredentialCreationConfigBuilder {
        CredentialCreationConfigBuilder::default()
    }
}

#[derive(Default)]
pub struct CredentialCreationConfigBuilder {
    holder_did: Option<DidValue>,
    issuer_did_document: Option<DidDocument>,
    key: Option<KeyReference>,
    contexts: Vec<String>,
    types: Vec<String>,
    subject: Option<TypedSubject>,
    expiration_date: Option<OffsetDateTime>,
    encoding: Option<CredentialEncoding>,
    revocable: bool,
    stored: Option<bool>,
}

impl CredentialCreationConfigBuilder {
    pub fn holder_did(mut self, holder_did: DidValue) -> Self {
        self.holder_did = Some(holder_did);
        self
    }

    pub fn issuer_did_document(mut self, did_document: DidDocument) -> Self {
        self.issuer_did_document = Some(did_document);
        self
    }

    pub fn key(mut self, key: KeyReference) -> Self {
        self.key = Some(key);
        self
    }

    pub fn contexts(mut self, contexts: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.contexts.extend(contexts.into_iter().map(Into::into));
        self
    }

    pub fn types(mut self, types: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.types.extend(types.into_iter().map(Into::into));
        self
    }

    pub fn subject(mut self, subject: TypedSubject) -> Self {
        self.subject = Some(subject);
        self
    }

    pub fn expiration_date(mut self, expiration_date: Option<OffsetDateTime>) -> Self {
        self.expiration_date = expiration_date;
        self
    }

    pub fn encoding(mut self, encoding: CredentialEncoding) -> Self {
        self.encoding = Some(encoding);
        self
    }

    pub fn revocable(mut self, revocable: bool) -> Self {
        self.revocable = revocable;
        self
    }

    /// Defaults to `true`.
    pub fn stored(mut self, stored: bool) -> Self {
        self.stored = Some(stored);
        self
    }

    pub fn build(self) -> Result<CredentialCreationConfig, ServiceError> {
        fn missing(field: &str) -> ServiceError {
            ServiceError::Validation(format!("credential creation config is missing `{field}`"))
        }

        if self.types.is_empty() {
            return Err(missing("types"));
        }

        Ok(CredentialCreationConfig {
            holder_did: self.holder_did.ok_or_else(|| missing("holder_did"))?,
            issuer_did_document: self
                .issuer_did_document
                .ok_or_else(|| missing("issuer_did_document"))?,
            key: self.key.ok_or_else(|| missing("key"))?,
            contexts: self.contexts,
            types: self.types,
            subject: self.subject.ok_or_else(|| missing("subject"))?,
            expiration_date: self.expiration_date,
            encoding: self.encoding.ok_or_else(|| missing("encoding"))?,
            revocable: self.revocable,
            stored: self.stored.unwrap_or(true),
        })
    }
}
