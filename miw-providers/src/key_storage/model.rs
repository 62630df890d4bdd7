//! `struct`s for key storage.

use crate::{common_models::did::DidValue, key_algorithm::KeyAlgorithmType};

/// A key as persisted by the encrypted store; `key_reference` is the sealed private key.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StoredKey {
    pub key_name: String,
    pub algorithm: KeyAlgorithmType,
    pub owner: DidValue,
    pub public_key: Vec<u8>,
    pub key_reference: Vec<u8>,
}

impl StoredKey {
    pub fn key_id(&self) -> String {
        format!("{}#{}", self.owner, self.key_name)
    }
}
