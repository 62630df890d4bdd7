use serde::{Deserialize, Serialize};

use crate::key_algorithm::KeyAlgorithmType;

/// A key owned by a wallet. The private half never leaves the key storage; only
/// the opaque reference is kept alongside the public key.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WalletKey {
    pub key_name: String,
    pub algorithm: KeyAlgorithmType,
    pub public_key: Vec<u8>,
}
