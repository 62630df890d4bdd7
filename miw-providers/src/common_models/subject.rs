//! Typed access to credential subjects.
//!
//! Subjects travel as plain JSON maps inside [`VerifiableCredential`]; the known
//! credential kinds are parsed into dedicated structs so that fields like the
//! summary `items` are read through explicit accessors instead of runtime casts.

use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::{Map, Value};
use serde_with::skip_serializing_none;
use thiserror::Error;

use super::credential::{
    VerifiableCredential, BPN_CREDENTIAL_TYPE, DISMANTLER_CREDENTIAL_TYPE,
    FRAMEWORK_CREDENTIAL_TYPE, MEMBERSHIP_CREDENTIAL_TYPE, STATUS_LIST_CREDENTIAL_TYPE,
    SUMMARY_CREDENTIAL_TYPE,
};
use crate::revocation::model::StatusPurpose;

#[derive(Debug, Error)]
pub enum SubjectError {
    #[error("Credential has no subject")]
    Missing,
    #[error("Credential has {0} subjects, exactly one expected")]
    Multiple(usize),
    #[error("Malformed `{kind}` subject: {reason}")]
    Malformed { kind: &'static str, reason: String },
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BpnSubject {
    pub id: String,
    pub bpn: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MembershipSubject {
    pub id: String,
    pub holder_identifier: String,
    pub member_of: String,
}

#[skip_serializing_none]
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DismantlerSubject {
    pub id: String,
    pub holder_identifier: String,
    pub activity_type: String,
    pub allowed_vehicle_brands: Option<Vec<String>>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FrameworkSubject {
    pub id: String,
    pub holder_identifier: String,
    pub use_case_type: String,
    pub contract_template: String,
    pub contract_version: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SummarySubject {
    pub id: String,
    pub holder_identifier: String,
    #[serde(default)]
    pub items: Vec<String>,
    pub contract_template: String,
}

impl SummarySubject {
    pub fn contains(&self, item: &str) -> bool {
        self.items.iter().any(|i| i == item)
    }

    /// Appends `item` unless already present, keeping the original order.
    pub fn add_item(&mut self, item: &str) -> bool {
        if self.contains(item) {
            return false;
        }
        self.items.push(item.to_owned());
        true
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusListSubject {
    pub id: String,
    pub r#type: String,
    pub status_purpose: StatusPurpose,
    pub encoded_list: String,
}

#[derive(Clone, Debug, PartialEq)]
pub enum TypedSubject {
    Bpn(BpnSubject),
    Membership(MembershipSubject),
    Dismantler(DismantlerSubject),
    Framework(FrameworkSubject),
    Summary(SummarySubject),
    StatusList(StatusListSubject),
    Generic(Map<String, Value>),
}

impl TypedSubject {
    /// Parses the single subject of a credential according to its types.
    pub fn from_credential(credential: &VerifiableCredential) -> Result<Self, SubjectError> {
        match credential.credential_subject.as_slice() {
            [] => Err(SubjectError::Missing),
            [subject] => Self::parse(&credential.r#type, subject),
            subjects => Err(SubjectError::Multiple(subjects.len())),
        }
    }

    pub fn parse(types: &[String], subject: &Map<String, Value>) -> Result<Self, SubjectError> {
        let has = |t: &str| types.iter().any(|candidate| candidate == t);

        Ok(if has(SUMMARY_CREDENTIAL_TYPE) {
            Self::Summary(from_map("summary", subject)?)
        } else if has(STATUS_LIST_CREDENTIAL_TYPE) {
            Self::StatusList(from_map("status list", subject)?)
        } else if has(MEMBERSHIP_CREDENTIAL_TYPE) {
            Self::Membership(from_map("membership", subject)?)
        } else if has(DISMANTLER_CREDENTIAL_TYPE) {
            Self::Dismantler(from_map("dismantler", subject)?)
        } else if has(FRAMEWORK_CREDENTIAL_TYPE) {
            Self::Framework(from_map("framework", subject)?)
        } else if has(BPN_CREDENTIAL_TYPE) {
            Self::Bpn(from_map("bpn", subject)?)
        } else {
            Self::Generic(subject.to_owned())
        })
    }

    pub fn into_map(self) -> Result<Map<String, Value>, SubjectError> {
        let value = match self {
            Self::Bpn(subject) => serde_json::to_value(subject),
            Self::Membership(subject) => serde_json::to_value(subject),
            Self::Dismantler(subject) => serde_json::to_value(subject),
            Self::Framework(subject) => serde_json::to_value(subject),
            Self::Summary(subject) => serde_json::to_value(subject),
            Self::StatusList(subject) => serde_json::to_value(subject),
            Self::Generic(map) => return Ok(map),
        }
        .map_err(|e| SubjectError::Malformed {
            kind: "typed",
            reason: e.to_string(),
        })?;

        match value {
            Value::Object(map) => Ok(map),
            _ => Err(SubjectError::Malformed {
                kind: "typed",
                reason: "subject is not an object".to_owned(),
            }),
        }
    }

    pub fn id(&self) -> Option<&str> {
        match self {
            Self::Bpn(subject) => Some(&subject.id),
            Self::Membership(subject) => Some(&subject.id),
            Self::Dismantler(subject) => Some(&subject.id),
            Self::Framework(subject) => Some(&subject.id),
            Self::Summary(subject) => Some(&subject.id),
            Self::StatusList(subject) => Some(&subject.id),
            Self::Generic(map) => map.get("id").and_then(Value::as_str),
        }
    }

    pub fn as_summary(&self) -> Option<&SummarySubject> {
        match self {
            Self::Summary(subject) => Some(subject),
            _ => None,
        }
    }

    pub fn as_status_list(&self) -> Option<&StatusListSubject> {
        match self {
            Self::StatusList(subject) => Some(subject),
            _ => None,
        }
    }

    pub fn framework_type(&self) -> Option<&str> {
        match self {
            Self::Framework(subject) => Some(&subject.use_case_type),
            _ => None,
        }
    }
}

fn from_map<T: DeserializeOwned>(
    kind: &'static str,
    subject: &Map<String, Value>,
) -> Result<T, SubjectError> {
    serde_json::from_value(Value::Object(subject.to_owned())).map_err(|e| {
        SubjectError::Malformed {
            kind,
            reason: e.to_string(),
        }
    })
}
