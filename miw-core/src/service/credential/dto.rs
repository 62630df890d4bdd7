use serde_json::{Map, Value};
use time::OffsetDateTime;

use miw_providers::{
    common_models::credential::VerifiableCredential,
    credential_formatter::model::CredentialEncoding, key_algorithm::KeyAlgorithmType,
};

/// Issuance of an arbitrary credential by the caller's own wallet.
#[derive(Clone, Debug, Default)]
pub struct IssueCredentialRequest {
    /// DID or BPN of the holder.
    pub holder: String,
    /// Added after the base context.
    pub contexts: Vec<String>,
    /// Added after the base type.
    pub types: Vec<String>,
    pub subject: Map<String, Value>,
    /// Defaults to the configured validity from now on.
    pub expiration_date: Option<OffsetDateTime>,
    /// Defaults to the issuer wallet's algorithm.
    pub algorithm: Option<KeyAlgorithmType>,
    /// Defaults to linked data where the algorithm allows it.
    pub encoding: Option<CredentialEncoding>,
    pub revocable: bool,
    /// Authorizes remote signing of the status list when `revocable` is set.
    pub token: Option<String>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ValidationResult {
    pub valid: bool,
    pub signature_valid: bool,
    pub expired: bool,
    /// `false` when revocation was not checked.
    pub revoked: bool,
    pub credential: VerifiableCredential,
}
