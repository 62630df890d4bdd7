use std::collections::BTreeMap;

use async_trait::async_trait;
use tokio::sync::Mutex;

use miw_providers::{
    common_models::{credential::VerifiableCredential, did::Bpn, now_utc},
    revocation::model::StatusPurpose,
};

use crate::{
    model::status_list::{StatusListCredential, StatusListIndex},
    repository::{error::DataLayerError, StatusListRepository},
};

#[derive(Default)]
struct Tables {
    credentials: BTreeMap<String, StatusListCredential>,
    indices: BTreeMap<String, StatusListIndex>,
}

#[derive(Default)]
pub struct InMemoryStatusListRepository {
    tables: Mutex<Tables>,
}

#[async_trait]
impl StatusListRepository for InMemoryStatusListRepository {
    async fn get_indices(
        &self,
        bpn: &Bpn,
        purpose: StatusPurpose,
    ) -> Result<Vec<StatusListIndex>, DataLayerError> {
        let tables = self.tables.lock().await;

        let mut indices: Vec<_> = tables
            .indices
            .values()
            .filter(|index| &index.bpn == bpn && index.purpose == purpose)
            .cloned()
            .collect();
        indices.sort_by_key(|index| index.list_number);

        Ok(indices)
    }

    async fn create_list(
        &self,
        credential: StatusListCredential,
        index: StatusListIndex,
    ) -> Result<(), DataLayerError> {
        let mut tables = self.tables.lock().await;

        if credential.id != index.id {
            return Err(DataLayerError::Db(format!(
                "credential `{}` and index `{}` differ",
                credential.id, index.id
            )));
        }
        if tables.credentials.contains_key(&credential.id)
            || tables.indices.contains_key(&index.id)
        {
            return Err(DataLayerError::AlreadyExists);
        }

        tables.credentials.insert(credential.id.to_owned(), credential);
        tables.indices.insert(index.id.to_owned(), index);
        Ok(())
    }

    async fn increment_index(
        &self,
        id: &str,
        capacity: usize,
    ) -> Result<Option<usize>, DataLayerError> {
        let mut tables = self.tables.lock().await;

        let index = tables
            .indices
            .get_mut(id)
            .ok_or(DataLayerError::RecordNotFound)?;
        if !index.has_capacity(capacity) {
            return Ok(None);
        }

        index.current_index += 1;
        usize::try_from(index.current_index)
            .map(Some)
            .map_err(|e| DataLayerError::Db(e.to_string()))
    }

    async fn get_credential(
        &self,
        id: &str,
    ) -> Result<Option<StatusListCredential>, DataLayerError> {
        Ok(self.tables.lock().await.credentials.get(id).cloned())
    }

    async fn update_credential(
        &self,
        id: &str,
        credential: VerifiableCredential,
        expected_revision: u64,
    ) -> Result<(), DataLayerError> {
        let mut tables = self.tables.lock().await;

        let stored = tables
            .credentials
            .get_mut(id)
            .ok_or(DataLayerError::RecordNotFound)?;
        if stored.revision != expected_revision {
            return Err(DataLayerError::Conflict);
        }

        stored.credential = credential;
        stored.revision += 1;
        stored.modified_at = now_utc();
        Ok(())
    }
}
