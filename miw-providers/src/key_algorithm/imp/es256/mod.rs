use p256::{
    elliptic_curve::{sec1::ToEncodedPoint, JwkEcKey},
    PublicKey,
};

use crate::{
    common_models::PublicKeyJwk,
    crypto::imp::signer::es256::{ES256Signer, ES256_SIGNER_ID},
    key_algorithm::{error::KeyAlgorithmError, model::GeneratedKey, KeyAlgorithm},
};


/// P-256 keys, kept as compressed SEC1 points.
pub struct Es256;

impl KeyAlgorithm for Es256 {
    fn get_signer_algorithm_id(&self) -> String {
        ES256_SIGNER_ID.to_string()
    }

    fn generate_key_pair(&self) -> GeneratedKey {
        let (private, public) = ES256Signer::random();

        GeneratedKey { public, private }
    }

    fn bytes_to_jwk(&self, bytes: &[u8]) -> Result<PublicKeyJwk, KeyAlgorithmError> {
        let key = PublicKey::from_sec1_bytes(bytes).map_err(failed)?;

        serde_json::to_value(key.to_jwk())
            .and_then(serde_json::from_value)
            .map_err(failed)
    }

    fn jwk_to_bytes(&self, jwk: &PublicKeyJwk) -> Result<Vec<u8>, KeyAlgorithmError> {
        if !matches!(jwk, PublicKeyJwk::Ec(_)) {
            return Err(KeyAlgorithmError::Failed("expected an EC key".to_string()));
        }

        let jwk: JwkEcKey = serde_json::to_value(jwk)
            .and_then(serde_json::from_value)
            .map_err(failed)?;
        let key = PublicKey::from_jwk(&jwk).map_err(failed)?;

        Ok(key.to_encoded_point(true).as_bytes().to_vec())
    }
}

fn failed(error: impl std::fmt::Display) -> KeyAlgorithmError {
    KeyAlgorithmError::Failed(error.to_string())
}
