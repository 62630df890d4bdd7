//! W3C credential and presentation documents as exchanged by the wallet.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use serde_with::{serde_as, skip_serializing_none, OneOrMany};
use time::OffsetDateTime;

use super::did::DidValue;
use crate::revocation::model::StatusEntry;

pub const VERIFIABLE_CREDENTIAL_TYPE: &str = "VerifiableCredential";
pub const VERIFIABLE_PRESENTATION_TYPE: &str = "VerifiablePresentation";
pub const SUMMARY_CREDENTIAL_TYPE: &str = "SummaryCredential";
pub const MEMBERSHIP_CREDENTIAL_TYPE: &str = "MembershipCredential";
pub const DISMANTLER_CREDENTIAL_TYPE: &str = "DismantlerCredential";
pub const BPN_CREDENTIAL_TYPE: &str = "BpnCredential";
pub const FRAMEWORK_CREDENTIAL_TYPE: &str = "UseCaseFrameworkCondition";
pub const STATUS_LIST_CREDENTIAL_TYPE: &str = "BitstringStatusListCredential";

pub const CREDENTIALS_V1_CONTEXT: &str = "https://www.w3.org/2018/credentials/v1";
pub const DATA_INTEGRITY_CONTEXT: &str = "https://w3id.org/security/data-integrity/v2";
pub const BITSTRING_STATUS_LIST_CONTEXT: &str =
    "https://w3c.github.io/vc-bitstring-status-list/contexts/v1.jsonld";
pub const SUMMARY_CONTEXT: &str =
    "https://catenax-ng.github.io/product-core-schemas/SummaryVC.json";
pub const BUSINESS_PARTNER_CONTEXT: &str =
    "https://catenax-ng.github.io/product-core-schemas/businessPartnerData.json";

pub const DATA_INTEGRITY_PROOF_TYPE: &str = "DataIntegrityProof";
pub const EDDSA_JCS_CRYPTOSUITE: &str = "eddsa-jcs-2022";
pub const ASSERTION_METHOD_PURPOSE: &str = "assertionMethod";
pub const AUTHENTICATION_PURPOSE: &str = "authentication";

#[serde_as]
#[skip_serializing_none]
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifiableCredential {
    #[serde(rename = "@context")]
    pub context: Vec<String>,
    pub id: Option<String>,
    pub r#type: Vec<String>,
    pub issuer: DidValue,
    #[serde(with = "time::serde::rfc3339")]
    pub issuance_date: OffsetDateTime,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub expiration_date: Option<OffsetDateTime>,
    #[serde_as(as = "OneOrMany<_>")]
    pub credential_subject: Vec<Map<String, Value>>,
    pub credential_status: Option<StatusEntry>,
    pub proof: Option<LdProof>,
}

impl VerifiableCredential {
    pub fn has_type(&self, r#type: &str) -> bool {
        self.r#type.iter().any(|t| t == r#type)
    }

    /// The most specific type, the last one that is not the base type.
    pub fn primary_type(&self) -> Option<&str> {
        self.r#type
            .iter()
            .rev()
            .find(|t| *t != VERIFIABLE_CREDENTIAL_TYPE)
            .map(String::as_str)
    }

    pub fn is_expired_at(&self, at: OffsetDateTime) -> bool {
        self.expiration_date.is_some_and(|expiry| expiry < at)
    }
}

#[skip_serializing_none]
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LdProof {
    pub r#type: String,
    pub cryptosuite: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created: OffsetDateTime,
    pub verification_method: String,
    pub proof_purpose: String,
    pub proof_value: Option<String>,
    pub challenge: Option<String>,
    pub domain: Option<String>,
}

#[skip_serializing_none]
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifiablePresentation {
    #[serde(rename = "@context")]
    pub context: Vec<String>,
    pub id: Option<String>,
    pub r#type: Vec<String>,
    pub holder: Option<DidValue>,
    /// Linked-data credentials as objects, JWT credentials as compact strings.
    #[serde(default)]
    pub verifiable_credential: Vec<Value>,
    pub proof: Option<LdProof>,
}

/// The two encodings a document can be signed into.
#[derive(Clone, Debug, PartialEq)]
pub enum SignedCredential {
    LinkedData(VerifiableCredential),
    Jwt {
        token: String,
        credential: VerifiableCredential,
    },
}

impl SignedCredential {
    pub fn credential(&self) -> &VerifiableCredential {
        match self {
            Self::LinkedData(credential) => credential,
            Self::Jwt { credential, .. } => credential,
        }
    }

    pub fn jwt(&self) -> Option<&str> {
        match self {
            Self::LinkedData(_) => None,
            Self::Jwt { token, .. } => Some(token),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum SignedPresentation {
    LinkedData(VerifiablePresentation),
    Jwt {
        token: String,
        presentation: VerifiablePresentation,
    },
}

impl SignedPresentation {
    pub fn presentation(&self) -> &VerifiablePresentation {
        match self {
            Self::LinkedData(presentation) => presentation,
            Self::Jwt { presentation, .. } => presentation,
        }
    }

    pub fn jwt(&self) -> Option<&str> {
        match self {
            Self::LinkedData(_) => None,
            Self::Jwt { token, .. } => Some(token),
        }
    }
}
