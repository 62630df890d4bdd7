//! Keys sealed at rest with a passphrase derived key.

use std::sync::Arc;

use async_trait::async_trait;
use cocoon::MiniCocoon;
use serde::Deserialize;
use zeroize::Zeroizing;

use crate::{
    common_models::{did::DidValue, key::WalletKey},
    crypto::imp::{password::derive_key_with_salt, utilities},
    key_algorithm::{provider::KeyAlgorithmProvider, KeyAlgorithmType},
    key_storage::{error::KeyStorageError, model::StoredKey, KeyProvider},
};


/// Persistence for sealed keys.
#[cfg_attr(any(test, feature = "mock"), mockall::automock)]
#[async_trait]
pub trait EncryptedKeyStore: Send + Sync {
    /// Fails with `AlreadyExists` if the name is taken for that algorithm.
    async fn insert(&self, key: StoredKey) -> Result<(), KeyStorageError>;

    async fn get(
        &self,
        key_name: &str,
        algorithm: KeyAlgorithmType,
    ) -> Result<Option<StoredKey>, KeyStorageError>;
}

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Params {
    /// Passphrase the sealing key is derived from; keys are stored in clear without it.
    pub encryption: Option<String>,
    pub salt: String,
    pub rounds: u32,
}

pub struct InternalKeyProvider {
    key_algorithm_provider: Arc<dyn KeyAlgorithmProvider>,
    store: Arc<dyn EncryptedKeyStore>,
    encryption_key: Option<Zeroizing<[u8; 32]>>,
}

impl InternalKeyProvider {
    pub fn new(
        key_algorithm_provider: Arc<dyn KeyAlgorithmProvider>,
        store: Arc<dyn EncryptedKeyStore>,
        params: Params,
    ) -> Self {
        Self {
            key_algorithm_provider,
            store,
            encryption_key: params.encryption.map(|passphrase| {
                Zeroizing::new(derive_key_with_salt(
                    &passphrase,
                    params.salt.as_bytes(),
                    params.rounds,
                ))
            }),
        }
    }

    /// Generates a fresh key pair for `owner` and stores it sealed.
    pub async fn generate_key(
        &self,
        owner: &DidValue,
        key_name: &str,
        algorithm: KeyAlgorithmType,
    ) -> Result<WalletKey, KeyStorageError> {
        let key_pair = self
            .key_algorithm_provider
            .get_key_algorithm(algorithm)
            .ok_or(KeyStorageError::InvalidKeyAlgorithm(algorithm))?
            .generate_key_pair();
        let private = Zeroizing::new(key_pair.private);

        self.store_key(owner, key_name, algorithm, key_pair.public, &private)
            .await
    }

    /// Imports existing private key material; the public key is derived from it.
    pub async fn import_key(
        &self,
        owner: &DidValue,
        key_name: &str,
        algorithm: KeyAlgorithmType,
        private_key: Zeroizing<Vec<u8>>,
    ) -> Result<WalletKey, KeyStorageError> {
        let signer = self
            .key_algorithm_provider
            .get_signer(algorithm)
            .map_err(|e| KeyStorageError::Failed(e.to_string()))?;
        let public_key = signer.public_key_from_private(&private_key)?;

        self.store_key(owner, key_name, algorithm, public_key, &private_key)
            .await
    }

    async fn store_key(
        &self,
        owner: &DidValue,
        key_name: &str,
        algorithm: KeyAlgorithmType,
        public_key: Vec<u8>,
        private_key: &[u8],
    ) -> Result<WalletKey, KeyStorageError> {
        self.store
            .insert(StoredKey {
                key_name: key_name.to_owned(),
                algorithm,
                owner: owner.to_owned(),
                public_key: public_key.clone(),
                key_reference: encrypt_if_password_is_provided(
                    private_key,
                    self.encryption_key.as_deref(),
                )?,
            })
            .await?;

        tracing::info!(%owner, key_name, %algorithm, "stored wallet key");

        Ok(WalletKey {
            key_name: key_name.to_owned(),
            algorithm,
            public_key,
        })
    }

    async fn stored_key(
        &self,
        key_name: &str,
        algorithm: KeyAlgorithmType,
    ) -> Result<StoredKey, KeyStorageError> {
        self.store
            .get(key_name, algorithm)
            .await?
            .ok_or_else(|| KeyStorageError::NotFound {
                key_name: key_name.to_owned(),
                algorithm,
            })
    }
}

#[async_trait]
impl KeyProvider for InternalKeyProvider {
    async fn get_private_key(
        &self,
        key_name: &str,
        algorithm: KeyAlgorithmType,
    ) -> Result<Zeroizing<Vec<u8>>, KeyStorageError> {
        let key = self.stored_key(key_name, algorithm).await?;

        decrypt_if_password_is_provided(&key.key_reference, self.encryption_key.as_deref())
    }

    async fn get_public_key(
        &self,
        key_name: &str,
        algorithm: KeyAlgorithmType,
    ) -> Result<Vec<u8>, KeyStorageError> {
        Ok(self.stored_key(key_name, algorithm).await?.public_key)
    }

    async fn get_key_id(
        &self,
        key_name: &str,
        algorithm: KeyAlgorithmType,
    ) -> Result<String, KeyStorageError> {
        Ok(self.stored_key(key_name, algorithm).await?.key_id())
    }
}

fn decrypt_if_password_is_provided(
    data: &[u8],
    encryption_key: Option<&[u8; 32]>,
) -> Result<Zeroizing<Vec<u8>>, KeyStorageError> {
    match encryption_key {
        None => Ok(Zeroizing::new(data.to_vec())),
        Some(encryption_key) => {
            // seed is not used for decryption
            let cocoon = MiniCocoon::from_key(encryption_key, &[0u8; 32]);
            cocoon
                .unwrap(data)
                .map(Zeroizing::new)
                .map_err(|_| KeyStorageError::PasswordDecryptionFailure)
        }
    }
}

fn encrypt_if_password_is_provided(
    buffer: &[u8],
    encryption_key: Option<&[u8; 32]>,
) -> Result<Vec<u8>, KeyStorageError> {
    match encryption_key {
        None => Ok(buffer.to_vec()),
        Some(encryption_key) => {
            let mut cocoon =
                MiniCocoon::from_key(encryption_key, &utilities::generate_random_seed_32());
            cocoon
                .wrap(buffer)
                .map_err(|_| KeyStorageError::Failed("Encryption failure".to_string()))
        }
    }
}
