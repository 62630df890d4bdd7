//! Enumerates errors related to key storage.

use thiserror::Error;

use crate::{
    crypto::SignerError,
    key_algorithm::{error::KeyAlgorithmError, KeyAlgorithmType},
};

#[derive(Debug, Error)]
pub enum KeyStorageError {
    #[error("Key `{key_name}` ({algorithm}) not found")]
    NotFound {
        key_name: String,
        algorithm: KeyAlgorithmType,
    },
    #[error("Key `{key_name}` ({algorithm}) already exists")]
    AlreadyExists {
        key_name: String,
        algorithm: KeyAlgorithmType,
    },
    #[error("Key storage failure: `{0}`")]
    Failed(String),
    #[error("Signer error: `{0}`")]
    SignerError(#[from] SignerError),
    #[error("Key algorithm error: `{0}`")]
    KeyAlgorithmError(#[from] KeyAlgorithmError),
    #[error("Password decryption failure")]
    PasswordDecryptionFailure,
    #[error("Invalid key algorithm `{0}`")]
    InvalidKeyAlgorithm(KeyAlgorithmType),
}
