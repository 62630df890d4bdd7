use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

pub const STATUS_LIST_ENTRY_TYPE: &str = "BitstringStatusListEntry";
pub const STATUS_LIST_SUBJECT_TYPE: &str = "BitstringStatusList";

#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Display,
    EnumString,
    Serialize,
    Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum StatusPurpose {
    Revocation,
    Suspension,
}

/// The `credentialStatus` entry of an issued credential.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusEntry {
    pub id: String,
    pub r#type: String,
    pub status_purpose: StatusPurpose,
    /// Decimal string, as in the W3C bitstring status list.
    pub status_list_index: String,
    pub status_list_credential: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Display, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CredentialRevocationState {
    Active,
    Revoked,
    Suspended,
}

impl CredentialRevocationState {
    /// The state a set bit means for a list of the given purpose.
    pub fn from_bit(purpose: StatusPurpose, bit: bool) -> Self {
        match (purpose, bit) {
            (_, false) => Self::Active,
            (StatusPurpose::Revocation, true) => Self::Revoked,
            (StatusPurpose::Suspension, true) => Self::Suspended,
        }
    }
}
