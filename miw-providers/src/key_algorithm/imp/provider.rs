use std::{collections::HashMap, sync::Arc};

use crate::{
    common_models::PublicKeyJwk,
    crypto::{CryptoProvider, Signer},
    key_algorithm::{
        error::KeyAlgorithmProviderError, model::ParsedPublicKeyJwk,
        provider::KeyAlgorithmProvider, KeyAlgorithm, KeyAlgorithmType,
    },
};

use super::{eddsa::Eddsa, es256::Es256};

pub struct KeyAlgorithmProviderImpl {
    algorithms: HashMap<KeyAlgorithmType, Arc<dyn KeyAlgorithm>>,
    crypto: Arc<dyn CryptoProvider>,
}

impl KeyAlgorithmProviderImpl {
    pub fn new(
        algorithms: HashMap<KeyAlgorithmType, Arc<dyn KeyAlgorithm>>,
        crypto: Arc<dyn CryptoProvider>,
    ) -> Self {
        Self { algorithms, crypto }
    }

    /// Both supported algorithms, backed by the given crypto provider.
    pub fn with_default_algorithms(crypto: Arc<dyn CryptoProvider>) -> Self {
        Self::new(
            HashMap::from_iter([
                (
                    KeyAlgorithmType::Eddsa,
                    Arc::new(Eddsa) as Arc<dyn KeyAlgorithm>,
                ),
                (KeyAlgorithmType::Es256, Arc::new(Es256) as _),
            ]),
            crypto,
        )
    }
}

impl KeyAlgorithmProvider for KeyAlgorithmProviderImpl {
    fn get_key_algorithm(&self, algorithm: KeyAlgorithmType) -> Option<Arc<dyn KeyAlgorithm>> {
        self.algorithms.get(&algorithm).cloned()
    }

    fn get_signer(
        &self,
        algorithm: KeyAlgorithmType,
    ) -> Result<Arc<dyn Signer>, KeyAlgorithmProviderError> {
        let key_algorithm = self.get_key_algorithm(algorithm).ok_or(
            KeyAlgorithmProviderError::MissingAlgorithmImplementation(algorithm.to_string()),
        )?;
        let signer_algorithm = key_algorithm.get_signer_algorithm_id();
        self.crypto
            .get_signer(&signer_algorithm)
            .map_err(|e| KeyAlgorithmProviderError::MissingSignerImplementation(e.to_string()))
    }

    fn parse_jwk(
        &self,
        key: &PublicKeyJwk,
    ) -> Result<ParsedPublicKeyJwk, KeyAlgorithmProviderError> {
        for (algorithm, implementation) in &self.algorithms {
            if let Ok(public_key_bytes) = implementation.jwk_to_bytes(key) {
                return Ok(ParsedPublicKeyJwk {
                    public_key_bytes,
                    algorithm: *algorithm,
                });
            }
        }

        Err(KeyAlgorithmProviderError::MissingAlgorithmImplementation(
            "None of the algorithms supports given key".to_string(),
        ))
    }
}
