use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::Mutex;

use super::internal::EncryptedKeyStore;
use crate::{
    key_algorithm::KeyAlgorithmType,
    key_storage::{error::KeyStorageError, model::StoredKey},
};

/// Process-local store for sealed keys.
#[derive(Default)]
pub struct InMemoryKeyStore {
    keys: Mutex<HashMap<(String, KeyAlgorithmType), StoredKey>>,
}

#[async_trait]
impl EncryptedKeyStore for InMemoryKeyStore {
    async fn insert(&self, key: StoredKey) -> Result<(), KeyStorageError> {
        let mut keys = self.keys.lock().await;

        let id = (key.key_name.clone(), key.algorithm);
        if keys.contains_key(&id) {
            return Err(KeyStorageError::AlreadyExists {
                key_name: key.key_name,
                algorithm: key.algorithm,
            });
        }

        keys.insert(id, key);
        Ok(())
    }

    async fn get(
        &self,
        key_name: &str,
        algorithm: KeyAlgorithmType,
    ) -> Result<Option<StoredKey>, KeyStorageError> {
        Ok(self
            .keys
            .lock()
            .await
            .get(&(key_name.to_owned(), algorithm))
            .cloned())
    }
}
