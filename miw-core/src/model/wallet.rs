use time::OffsetDateTime;

use miw_providers::{
    common_models::{
        did::{Bpn, DidValue},
        key::WalletKey,
    },
    did::model::DidDocument,
    key_algorithm::KeyAlgorithmType,
    signing::{KeyReference, SigningServiceType},
};

#[derive(Clone, Debug, PartialEq)]
pub struct Wallet {
    pub bpn: Bpn,
    pub name: String,
    pub did: DidValue,
    pub did_document: DidDocument,
    /// Which signing service holds the keys of this wallet.
    pub signing_service_type: SigningServiceType,
    /// Algorithm used for credentials unless the caller asks otherwise.
    pub algorithm: KeyAlgorithmType,
    pub keys: Vec<WalletKey>,
    pub created_at: OffsetDateTime,
}

impl Wallet {
    pub fn key_reference(&self, algorithm: KeyAlgorithmType) -> Option<KeyReference> {
        self.keys
            .iter()
            .find(|key| key.algorithm == algorithm)
            .map(|key| KeyReference {
                key_name: key.key_name.to_owned(),
                algorithm,
            })
    }

    pub fn default_key_reference(&self) -> Option<KeyReference> {
        self.key_reference(self.algorithm)
    }
}

/// Name of the key a wallet holds for `algorithm`.
pub fn key_name(bpn: &Bpn, algorithm: KeyAlgorithmType) -> String {
    format!("{bpn}-{}", algorithm.to_string().to_lowercase())
}
