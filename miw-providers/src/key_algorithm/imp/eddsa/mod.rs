use ct_codecs::{Base64UrlSafeNoPadding, Decoder, Encoder};
use ed25519_compact::{KeyPair, PublicKey};

use crate::{
    common_models::{PublicKeyJwk, PublicKeyJwkEllipticData},
    crypto::imp::signer::eddsa::EDDSA_SIGNER_ID,
    key_algorithm::{error::KeyAlgorithmError, model::GeneratedKey, KeyAlgorithm},
};

#[cfg(test)]
mod test;

const CURVE: &str = "Ed25519";

/// Ed25519 keys; private keys are stored as the 64-byte keypair.
pub struct Eddsa;

impl KeyAlgorithm for Eddsa {
    fn get_signer_algorithm_id(&self) -> String {
        EDDSA_SIGNER_ID.to_string()
    }

    fn generate_key_pair(&self) -> GeneratedKey {
        let KeyPair { pk, sk } = KeyPair::generate();

        GeneratedKey {
            public: pk.to_vec(),
            private: sk.to_vec(),
        }
    }

    fn bytes_to_jwk(&self, bytes: &[u8]) -> Result<PublicKeyJwk, KeyAlgorithmError> {
        let key = PublicKey::from_slice(bytes)
            .map_err(|e| KeyAlgorithmError::Failed(format!("invalid Ed25519 key: {e}")))?;
        let x = Base64UrlSafeNoPadding::encode_to_string(key.as_ref())
            .map_err(|e| KeyAlgorithmError::Failed(e.to_string()))?;

        Ok(PublicKeyJwk::Okp(PublicKeyJwkEllipticData {
            r#use: None,
            crv: CURVE.to_string(),
            x,
            y: None,
        }))
    }

    fn jwk_to_bytes(&self, jwk: &PublicKeyJwk) -> Result<Vec<u8>, KeyAlgorithmError> {
        let PublicKeyJwk::Okp(data) = jwk else {
            return Err(KeyAlgorithmError::Failed("expected an OKP key".to_string()));
        };
        if data.crv != CURVE {
            return Err(KeyAlgorithmError::Failed(format!(
                "unsupported curve `{}`",
                data.crv
            )));
        }

        let bytes = Base64UrlSafeNoPadding::decode_to_vec(&data.x, None)
            .map_err(|e| KeyAlgorithmError::Failed(e.to_string()))?;
        PublicKey::from_slice(&bytes)
            .map(|key| key.to_vec())
            .map_err(|e| KeyAlgorithmError::Failed(format!("invalid Ed25519 key: {e}")))
    }
}
