use serde_json::json;
use time::{macros::datetime, Duration, OffsetDateTime};

use miw_providers::{
    common_models::{
        credential::VerifiableCredential,
        did::{Bpn, DidValue},
    },
    key_algorithm::KeyAlgorithmType,
    revocation::model::StatusPurpose,
    signing::SigningServiceType,
};

use super::{
    InMemoryCredentialRepository, InMemoryStatusListRepository, InMemoryWalletRepository,
};
use crate::{
    model::{
        credential::{LedgerEntry, Supersede},
        list_query::{CredentialQuery, CredentialSortColumn, SortDirection},
        status_list::{StatusListCredential, StatusListIndex},
        wallet::Wallet,
    },
    repository::{
        error::DataLayerError, CredentialRepository, StatusListRepository, WalletRepository,
    },
};

const ISSUER: &str = "did:web:localhost:BPNL000000000000";
const HOLDER: &str = "did:web:localhost:BPNL000000000001";

fn credential(r#type: &str) -> VerifiableCredential {
    serde_json::from_value(json!({
        "@context": ["https://www.w3.org/2018/credentials/v1"],
        "type": ["VerifiableCredential", r#type],
        "issuer": ISSUER,
        "issuanceDate": "2024-05-01T10:00:00Z",
        "credentialSubject": { "id": HOLDER }
    }))
    .unwrap()
}

fn entry(id: &str, r#type: &str, created_at: OffsetDateTime) -> LedgerEntry {
    LedgerEntry {
        credential_id: id.to_string(),
        holder_did: DidValue::from(HOLDER),
        holder_bpn: Bpn::from("BPNL000000000001"),
        issuer_did: DidValue::from(ISSUER),
        issuer_bpn: Bpn::from("BPNL000000000000"),
        r#type: r#type.to_string(),
        credential: credential(r#type),
        jwt: None,
        self_issued: false,
        stored: true,
        created_at,
    }
}

fn all() -> CredentialQuery {
    CredentialQuery::default()
}

fn current(expected: Option<&str>) -> Supersede {
    Supersede::Current {
        expected: expected.map(ToString::to_string),
    }
}

#[tokio::test]
async fn test_insert_issued_writes_both_ledgers() {
    let repository = InMemoryCredentialRepository::default();
    let created_at = datetime!(2024-05-01 10:00 UTC);

    repository
        .insert_issued(entry("1", "MembershipCredential", created_at), Supersede::Nothing)
        .await
        .unwrap();

    assert_eq!(1, repository.get_holder_credentials(all()).await.unwrap().total_items);
    assert_eq!(1, repository.get_issued_credentials(all()).await.unwrap().total_items);

    let result = repository
        .insert_issued(entry("1", "BpnCredential", created_at), Supersede::Nothing)
        .await;
    assert_eq!(Err(DataLayerError::AlreadyExists), result);

    let holder = repository.get_holder_credentials(all()).await.unwrap();
    let issuer = repository.get_issued_credentials(all()).await.unwrap();
    assert_eq!(1, holder.total_items);
    assert_eq!(1, issuer.total_items);
    assert_eq!("MembershipCredential", holder.values[0].r#type);
}

#[tokio::test]
async fn test_failed_supersede_keeps_previous_holder_copy() {
    let repository = InMemoryCredentialRepository::default();
    let created_at = datetime!(2024-05-01 10:00 UTC);
    repository
        .insert_issued(entry("summary-1", "SummaryCredential", created_at), Supersede::Nothing)
        .await
        .unwrap();

    let result = repository
        .insert_issued(
            entry("summary-1", "SummaryCredential", created_at),
            current(Some("summary-1")),
        )
        .await;

    assert_eq!(Err(DataLayerError::AlreadyExists), result);
    assert_eq!(1, repository.get_holder_credentials(all()).await.unwrap().total_items);
}

#[tokio::test]
async fn test_supersede_removes_holder_copy_only() {
    let repository = InMemoryCredentialRepository::default();
    let created_at = datetime!(2024-05-01 10:00 UTC);

    repository
        .insert_issued(entry("summary-1", "SummaryCredential", created_at), Supersede::Nothing)
        .await
        .unwrap();
    repository
        .insert_issued(
            entry("summary-2", "SummaryCredential", created_at),
            current(Some("summary-1")),
        )
        .await
        .unwrap();

    let holder = repository.get_holder_credentials(all()).await.unwrap();
    assert_eq!(
        vec!["summary-2"],
        holder
            .values
            .iter()
            .map(|entry| entry.credential_id.as_str())
            .collect::<Vec<_>>()
    );
    assert_eq!(2, repository.get_issued_credentials(all()).await.unwrap().total_items);

    // same timestamp, the later insertion is the latest
    let latest = repository
        .get_latest_issued(
            &DidValue::from(ISSUER),
            &DidValue::from(HOLDER),
            "SummaryCredential",
        )
        .await
        .unwrap()
        .unwrap();
    assert_eq!("summary-2", latest.credential_id);
}

#[tokio::test]
async fn test_supersede_rejects_stale_expectation() {
    let repository = InMemoryCredentialRepository::default();
    let created_at = datetime!(2024-05-01 10:00 UTC);

    repository
        .insert_issued(entry("summary-1", "SummaryCredential", created_at), current(None))
        .await
        .unwrap();

    // built without seeing summary-1
    assert_eq!(
        Err(DataLayerError::Conflict),
        repository
            .insert_issued(entry("summary-2", "SummaryCredential", created_at), current(None))
            .await
    );

    repository
        .insert_issued(
            entry("summary-3", "SummaryCredential", created_at),
            current(Some("summary-1")),
        )
        .await
        .unwrap();

    // summary-1 was already replaced by summary-3
    assert_eq!(
        Err(DataLayerError::Conflict),
        repository
            .insert_issued(
                entry("summary-4", "SummaryCredential", created_at),
                current(Some("summary-1")),
            )
            .await
    );

    let holder = repository.get_holder_credentials(all()).await.unwrap();
    assert_eq!(1, holder.total_items);
    assert_eq!("summary-3", holder.values[0].credential_id);
    assert_eq!(2, repository.get_issued_credentials(all()).await.unwrap().total_items);
}

#[tokio::test]
async fn test_supersede_only_touches_the_same_type() {
    let repository = InMemoryCredentialRepository::default();
    let created_at = datetime!(2024-05-01 10:00 UTC);

    repository
        .insert_issued(entry("1", "MembershipCredential", created_at), Supersede::Nothing)
        .await
        .unwrap();
    repository
        .insert_issued(entry("summary-1", "SummaryCredential", created_at), current(None))
        .await
        .unwrap();

    assert_eq!(2, repository.get_holder_credentials(all()).await.unwrap().total_items);
}

#[tokio::test]
async fn test_query_filters_sorts_and_pages() {
    let repository = InMemoryCredentialRepository::default();
    let start = datetime!(2024-05-01 10:00 UTC);
    for (i, r#type) in ["BpnCredential", "MembershipCredential", "DismantlerCredential"]
        .into_iter()
        .enumerate()
    {
        repository
            .insert_issued(
                entry(&i.to_string(), r#type, start + Duration::minutes(i as i64)),
                Supersede::Nothing,
            )
            .await
            .unwrap();
    }

    let page = repository
        .get_holder_credentials(CredentialQuery {
            direction: SortDirection::Desc,
            page: 0,
            page_size: 2,
            ..all()
        })
        .await
        .unwrap();
    assert_eq!(3, page.total_items);
    assert_eq!(2, page.total_pages);
    assert_eq!("DismantlerCredential", page.values[0].r#type);
    assert_eq!("MembershipCredential", page.values[1].r#type);

    let second = repository
        .get_holder_credentials(CredentialQuery {
            direction: SortDirection::Desc,
            page: 1,
            page_size: 2,
            ..all()
        })
        .await
        .unwrap();
    assert_eq!(1, second.values.len());
    assert_eq!("BpnCredential", second.values[0].r#type);

    let filtered = repository
        .get_issued_credentials(CredentialQuery {
            types: vec!["MembershipCredential".to_string(), "BpnCredential".to_string()],
            sort: CredentialSortColumn::Type,
            ..all()
        })
        .await
        .unwrap();
    assert_eq!(
        vec!["BpnCredential", "MembershipCredential"],
        filtered
            .values
            .iter()
            .map(|entry| entry.r#type.as_str())
            .collect::<Vec<_>>()
    );

    let none = repository
        .get_holder_credentials(CredentialQuery {
            issuer: Some(DidValue::from(HOLDER)),
            ..all()
        })
        .await
        .unwrap();
    assert_eq!(0, none.total_items);
    assert_eq!(0, none.total_pages);
}

fn status_list(list_number: u32) -> (StatusListCredential, StatusListIndex) {
    let id = format!("BPNL000000000000-revocation#{list_number}");
    let created_at = datetime!(2024-05-01 10:00 UTC);
    (
        StatusListCredential {
            id: id.clone(),
            bpn: Bpn::from("BPNL000000000000"),
            purpose: StatusPurpose::Revocation,
            list_number,
            credential: credential("BitstringStatusListCredential"),
            revision: 0,
            created_at,
            modified_at: created_at,
        },
        StatusListIndex {
            id,
            bpn: Bpn::from("BPNL000000000000"),
            purpose: StatusPurpose::Revocation,
            list_number,
            current_index: -1,
            created_at,
        },
    )
}

#[tokio::test]
async fn test_status_list_index_stops_at_capacity() {
    let repository = InMemoryStatusListRepository::default();
    let (credential, index) = status_list(1);
    repository.create_list(credential, index).await.unwrap();

    let id = "BPNL000000000000-revocation#1";
    assert_eq!(Some(0), repository.increment_index(id, 3).await.unwrap());
    assert_eq!(Some(1), repository.increment_index(id, 3).await.unwrap());
    assert_eq!(Some(2), repository.increment_index(id, 3).await.unwrap());
    assert_eq!(None, repository.increment_index(id, 3).await.unwrap());

    let indices = repository
        .get_indices(&Bpn::from("BPNL000000000000"), StatusPurpose::Revocation)
        .await
        .unwrap();
    assert_eq!(2, indices[0].current_index);
    assert!(repository
        .get_indices(&Bpn::from("BPNL000000000000"), StatusPurpose::Suspension)
        .await
        .unwrap()
        .is_empty());

    assert_eq!(
        Err(DataLayerError::RecordNotFound),
        repository.increment_index("unknown", 3).await
    );
}

#[tokio::test]
async fn test_status_list_generations() {
    let repository = InMemoryStatusListRepository::default();
    let (credential, index) = status_list(2);
    repository.create_list(credential, index).await.unwrap();
    let (credential, index) = status_list(1);
    repository.create_list(credential, index).await.unwrap();

    let (credential, index) = status_list(1);
    assert_eq!(
        Err(DataLayerError::AlreadyExists),
        repository.create_list(credential, index).await
    );

    let numbers: Vec<_> = repository
        .get_indices(&Bpn::from("BPNL000000000000"), StatusPurpose::Revocation)
        .await
        .unwrap()
        .into_iter()
        .map(|index| index.list_number)
        .collect();
    assert_eq!(vec![1, 2], numbers);
}

#[tokio::test]
async fn test_status_list_update_requires_current_revision() {
    let repository = InMemoryStatusListRepository::default();
    let (credential, index) = status_list(1);
    repository.create_list(credential, index).await.unwrap();
    let id = "BPNL000000000000-revocation#1";

    repository
        .update_credential(id, credential_with_id("updated"), 0)
        .await
        .unwrap();
    assert_eq!(
        Err(DataLayerError::Conflict),
        repository
            .update_credential(id, credential_with_id("stale"), 0)
            .await
    );

    let stored = repository.get_credential(id).await.unwrap().unwrap();
    assert_eq!(1, stored.revision);
    assert_eq!(Some("updated".to_string()), stored.credential.id);
}

fn credential_with_id(id: &str) -> VerifiableCredential {
    VerifiableCredential {
        id: Some(id.to_string()),
        ..credential("BitstringStatusListCredential")
    }
}

fn wallet(bpn: &str, did: &str) -> Wallet {
    Wallet {
        bpn: Bpn::from(bpn),
        name: bpn.to_string(),
        did: DidValue::from(did),
        did_document: serde_json::from_value(json!({
            "@context": ["https://www.w3.org/ns/did/v1"],
            "id": did
        }))
        .unwrap(),
        signing_service_type: SigningServiceType::Local,
        algorithm: KeyAlgorithmType::Eddsa,
        keys: vec![],
        created_at: datetime!(2024-05-01 10:00 UTC),
    }
}

#[tokio::test]
async fn test_wallet_uniqueness() {
    let repository = InMemoryWalletRepository::default();
    repository
        .create_wallet(wallet("BPNL000000000000", ISSUER))
        .await
        .unwrap();

    assert_eq!(
        Some(DidValue::from(ISSUER)),
        repository
            .get_wallet_by_bpn(&Bpn::from("BPNL000000000000"))
            .await
            .unwrap()
            .map(|wallet| wallet.did)
    );
    assert_eq!(
        Some(Bpn::from("BPNL000000000000")),
        repository
            .get_wallet_by_did(&DidValue::from(ISSUER))
            .await
            .unwrap()
            .map(|wallet| wallet.bpn)
    );

    assert_eq!(
        Err(DataLayerError::AlreadyExists),
        repository
            .create_wallet(wallet("BPNL000000000000", HOLDER))
            .await
    );
    assert_eq!(
        Err(DataLayerError::AlreadyExists),
        repository
            .create_wallet(wallet("BPNL000000000001", ISSUER))
            .await
    );
}
