use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{credential_formatter::model::CredentialEncoding, key_algorithm::KeyAlgorithmType};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub(super) enum SignatureKindRestEnum {
    Credential,
    Presentation,
    StatusList,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct RemoteSignRequestRestDTO<'a> {
    pub kind: SignatureKindRestEnum,
    pub key_name: &'a str,
    pub algorithm: KeyAlgorithmType,
    pub encoding: CredentialEncoding,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub challenge: Option<String>,
    pub document: Value,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct RemoteSignResponseRestDTO {
    #[serde(default)]
    pub document: Option<Value>,
    #[serde(default)]
    pub jwt: Option<String>,
}
