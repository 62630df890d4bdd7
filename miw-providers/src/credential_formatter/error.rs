//! Enumerates errors for credential formatting.

use thiserror::Error;

use crate::crypto::HasherError;

#[derive(Debug, PartialEq, Eq, Error)]
pub enum FormatterError {
    #[error("Could not sign: `{0}`")]
    CouldNotSign(String),
    #[error("Could not verify: `{0}`")]
    CouldNotVerify(String),
    #[error("Could not format: `{0}`")]
    CouldNotFormat(String),
    #[error("Could not extract credentials: `{0}`")]
    CouldNotExtractCredentials(String),
    #[error("Missing proof")]
    MissingProof,
    #[error("Missing issuer")]
    MissingIssuer,
    #[error("Unsupported proof: `{0}`")]
    UnsupportedProof(String),
    #[error("Hasher error: `{0}`")]
    HasherError(#[from] HasherError),
    #[error("JSON mapping error: `{0}`")]
    JsonMapping(String),
}
