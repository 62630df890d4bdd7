//! Enumerates errors related to signing services.

use thiserror::Error;

use crate::{
    credential_formatter::{error::FormatterError, model::CredentialEncoding},
    crypto::SignerError,
    http_client,
    key_algorithm::{error::KeyAlgorithmProviderError, KeyAlgorithmType},
    key_storage::error::KeyStorageError,
};

use super::SigningServiceType;

#[derive(Debug, Error)]
pub enum SigningServiceError {
    #[error("Algorithm {algorithm} cannot be used with {encoding} encoding")]
    UnsupportedConfiguration {
        algorithm: KeyAlgorithmType,
        encoding: CredentialEncoding,
    },
    #[error("Missing signing service `{0}`")]
    MissingSigningService(SigningServiceType),
    #[error("Signing service misconfigured: `{0}`")]
    Configuration(String),
    #[error("Missing token for remote signing")]
    MissingToken,
    #[error("Remote signer responded with status {status}: {message}")]
    Remote { status: u16, message: String },
    #[error("Remote signer returned an unusable response: `{0}`")]
    InvalidResponse(String),
    #[error("Transport error: `{0}`")]
    Transport(#[from] http_client::Error),
    #[error("Key storage error: `{0}`")]
    KeyStorage(#[from] KeyStorageError),
    #[error("Key algorithm error: `{0}`")]
    KeyAlgorithm(#[from] KeyAlgorithmProviderError),
    #[error("Formatter error: `{0}`")]
    Formatter(#[from] FormatterError),
    #[error("Signer error: `{0}`")]
    Signer(#[from] SignerError),
    #[error("JSON mapping error: `{0}`")]
    JsonMapping(#[from] serde_json::Error),
}
