use async_trait::async_trait;
use tokio::sync::Mutex;

use miw_providers::common_models::did::DidValue;

use crate::{
    model::{
        credential::{LedgerEntry, Supersede},
        list_query::{CredentialQuery, CredentialSortColumn, GetListResponse, SortDirection},
    },
    repository::{error::DataLayerError, CredentialRepository},
};

#[derive(Default)]
struct Ledgers {
    holder: Vec<LedgerEntry>,
    issuer: Vec<LedgerEntry>,
}

/// Both ledgers share one lock, so a paired write is never half visible.
#[derive(Default)]
pub struct InMemoryCredentialRepository {
    ledgers: Mutex<Ledgers>,
}

#[async_trait]
impl CredentialRepository for InMemoryCredentialRepository {
    async fn insert_issued(
        &self,
        entry: LedgerEntry,
        supersede: Supersede,
    ) -> Result<(), DataLayerError> {
        let mut ledgers = self.ledgers.lock().await;

        let taken = |ledger: &[LedgerEntry]| {
            ledger
                .iter()
                .any(|existing| existing.credential_id == entry.credential_id)
        };
        if taken(&ledgers.holder) || taken(&ledgers.issuer) {
            return Err(DataLayerError::AlreadyExists);
        }

        if let Supersede::Current { expected } = supersede {
            let replaces = |existing: &LedgerEntry| {
                existing.issuer_did == entry.issuer_did
                    && existing.holder_did == entry.holder_did
                    && existing.credential.has_type(&entry.r#type)
            };
            let current: Vec<_> = ledgers
                .holder
                .iter()
                .filter(|existing| replaces(existing))
                .map(|existing| existing.credential_id.as_str())
                .collect();
            let up_to_date = match &expected {
                Some(expected) => current == [expected.as_str()],
                None => current.is_empty(),
            };
            if !up_to_date {
                return Err(DataLayerError::Conflict);
            }

            ledgers.holder.retain(|existing| !replaces(existing));
        }

        ledgers.issuer.push(entry.clone());
        ledgers.holder.push(entry);
        Ok(())
    }

    async fn get_holder_credentials(
        &self,
        query: CredentialQuery,
    ) -> Result<GetListResponse<LedgerEntry>, DataLayerError> {
        Ok(run_query(&self.ledgers.lock().await.holder, &query))
    }

    async fn get_issued_credentials(
        &self,
        query: CredentialQuery,
    ) -> Result<GetListResponse<LedgerEntry>, DataLayerError> {
        Ok(run_query(&self.ledgers.lock().await.issuer, &query))
    }

    async fn get_latest_issued(
        &self,
        issuer: &DidValue,
        holder: &DidValue,
        r#type: &str,
    ) -> Result<Option<LedgerEntry>, DataLayerError> {
        let ledgers = self.ledgers.lock().await;

        // max_by_key keeps the last of equal keys, the most recent insertion
        Ok(ledgers
            .issuer
            .iter()
            .filter(|entry| {
                &entry.issuer_did == issuer
                    && &entry.holder_did == holder
                    && entry.credential.has_type(r#type)
            })
            .max_by_key(|entry| entry.created_at)
            .cloned())
    }
}

fn run_query(ledger: &[LedgerEntry], query: &CredentialQuery) -> GetListResponse<LedgerEntry> {
    let mut values: Vec<_> = ledger
        .iter()
        .filter(|entry| matches(entry, query))
        .cloned()
        .collect();

    values.sort_by(|a, b| {
        let ordering = match query.sort {
            CredentialSortColumn::CreatedAt => a.created_at.cmp(&b.created_at),
            CredentialSortColumn::Issuer => a.issuer_did.cmp(&b.issuer_did),
            CredentialSortColumn::Holder => a.holder_did.cmp(&b.holder_did),
            CredentialSortColumn::Type => a.r#type.cmp(&b.r#type),
        };
        match query.direction {
            SortDirection::Asc => ordering,
            SortDirection::Desc => ordering.reverse(),
        }
    });

    let page_size = query.effective_page_size();
    let total_items = values.len();

    GetListResponse {
        values: values
            .into_iter()
            .skip(query.page.saturating_mul(page_size))
            .take(page_size)
            .collect(),
        total_pages: total_items.div_ceil(page_size),
        total_items,
    }
}

fn matches(entry: &LedgerEntry, query: &CredentialQuery) -> bool {
    query
        .issuer
        .as_ref()
        .map_or(true, |issuer| &entry.issuer_did == issuer)
        && query
            .holder
            .as_ref()
            .map_or(true, |holder| &entry.holder_did == holder)
        && query
            .credential_id
            .as_ref()
            .map_or(true, |id| &entry.credential_id == id)
        && (query.types.is_empty()
            || query
                .types
                .iter()
                .any(|r#type| entry.credential.has_type(r#type)))
}
