use time::OffsetDateTime;

use miw_providers::{
    common_models::{credential::VerifiableCredential, did::Bpn},
    revocation::model::StatusPurpose,
};

/// The signed status-list credential of one list generation.
#[derive(Clone, Debug, PartialEq)]
pub struct StatusListCredential {
    /// `{bpn}-{purpose}#{listNumber}`
    pub id: String,
    pub bpn: Bpn,
    pub purpose: StatusPurpose,
    pub list_number: u32,
    pub credential: VerifiableCredential,
    /// Bumped on every update; writers must present the revision they read.
    pub revision: u64,
    pub created_at: OffsetDateTime,
    pub modified_at: OffsetDateTime,
}

/// Allocation counter of one list generation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StatusListIndex {
    /// Same id as the matching [`StatusListCredential`].
    pub id: String,
    pub bpn: Bpn,
    pub purpose: StatusPurpose,
    pub list_number: u32,
    /// Last handed out index, `-1` while the list is empty.
    pub current_index: i64,
    pub created_at: OffsetDateTime,
}

impl StatusListIndex {
    pub fn has_capacity(&self, capacity: usize) -> bool {
        self.current_index + 1 < capacity as i64
    }
}
