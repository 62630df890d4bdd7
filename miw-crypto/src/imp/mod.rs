use std::{collections::HashMap, sync::Arc};

use super::{CryptoProvider, CryptoProviderError, Hasher, Signer};

pub mod hasher;
pub mod password;
pub mod signer;
pub mod utilities;


pub const SHA_256: &str = "sha-256";

#[derive(Clone)]
pub struct CryptoProviderImpl {
    hashers: HashMap<String, Arc<dyn Hasher>>,
    signers: HashMap<String, Arc<dyn Signer>>,
}

impl CryptoProviderImpl {
    pub fn new(
        hashers: HashMap<String, Arc<dyn Hasher>>,
        signers: HashMap<String, Arc<dyn Signer>>,
    ) -> Self {
        Self { hashers, signers }
    }
}

impl Default for CryptoProviderImpl {
    /// SHA-256 plus the Ed25519 and ES256 signers.
    fn default() -> Self {
        Self::new(
            HashMap::from_iter(vec![(
                SHA_256.to_string(),
                Arc::new(hasher::sha256::SHA256 {}) as _,
            )]),
            HashMap::from_iter(vec![
                (
                    signer::eddsa::EDDSA_SIGNER_ID.to_string(),
                    Arc::new(signer::eddsa::EDDSASigner {}) as _,
                ),
                (
                    signer::es256::ES256_SIGNER_ID.to_string(),
                    Arc::new(signer::es256::ES256Signer {}) as _,
                ),
            ]),
        )
    }
}

impl CryptoProvider for CryptoProviderImpl {
    fn get_hasher(&self, hasher: &str) -> Result<Arc<dyn Hasher>, CryptoProviderError> {
        self.hashers
            .get(hasher)
            .cloned()
            .ok_or(CryptoProviderError::MissingHasher(hasher.to_owned()))
    }

    fn get_signer(&self, signer: &str) -> Result<Arc<dyn Signer>, CryptoProviderError> {
        self.signers
            .get(signer)
            .cloned()
            .ok_or(CryptoProviderError::MissingSigner(signer.to_owned()))
    }
}
