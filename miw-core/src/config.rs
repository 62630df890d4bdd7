use serde::Deserialize;
use url::Url;

use miw_crypto::imp::password::DEFAULT_ROUNDS;
use miw_providers::{
    common_models::did::Bpn, key_storage::imp::internal::Params as InternalKeyProviderParams,
    signing::imp::remote::Params as RemoteSigningParams,
};

pub const DEFAULT_STATUS_LIST_CAPACITY: usize = 131072;
pub const DEFAULT_MAX_STATUS_LIST_CAPACITY: usize = 16 * DEFAULT_STATUS_LIST_CAPACITY;

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MiwConfig {
    /// Operator wallet issuing BPN, membership, dismantler and framework credentials.
    pub authority_bpn: Bpn,
    /// Public host serving DID documents and status lists.
    pub base_url: String,
    pub status_list_capacity: usize,
    /// Largest status list read back, in bits. Lists of `status_list_capacity` are
    /// always accepted.
    pub max_status_list_capacity: usize,
    pub vc_expiry_days: i64,
    pub contract_template_url: String,
    pub member_of: String,
    pub remote_signing: Option<RemoteSigningParams>,
    pub key_encryption: InternalKeyProviderParams,
    /// Resolves foreign `did:web` identifiers over plain HTTP.
    pub resolve_did_web_insecure: bool,
}

impl Default for MiwConfig {
    fn default() -> Self {
        Self {
            authority_bpn: Bpn::from("BPNL000000000000"),
            base_url: "http://localhost:8080".to_string(),
            status_list_capacity: DEFAULT_STATUS_LIST_CAPACITY,
            max_status_list_capacity: DEFAULT_MAX_STATUS_LIST_CAPACITY,
            vc_expiry_days: 365,
            contract_template_url: "https://public.catena-x.org/contracts/".to_string(),
            member_of: "Catena-X".to_string(),
            remote_signing: None,
            key_encryption: InternalKeyProviderParams {
                encryption: None,
                salt: "miw".to_string(),
                rounds: DEFAULT_ROUNDS,
            },
            resolve_did_web_insecure: false,
        }
    }
}

impl MiwConfig {
    pub fn base_url(&self) -> Result<Url, url::ParseError> {
        Url::parse(&self.base_url)
    }
}
