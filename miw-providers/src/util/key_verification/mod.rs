//! Utilities for signature verification.

use std::sync::Arc;

use async_trait::async_trait;

use crate::{
    common_models::did::DidValue,
    credential_formatter::model::TokenVerifier,
    crypto::SignerError,
    did::DidResolver,
    key_algorithm::{provider::KeyAlgorithmProvider, KeyAlgorithmType},
};

#[cfg(test)]
mod test;

/// Verifies signatures against the keys published in the signer's DID document.
#[derive(Clone)]
pub struct KeyVerification {
    pub did_resolver: Arc<dyn DidResolver>,
    pub key_algorithm_provider: Arc<dyn KeyAlgorithmProvider>,
}

#[async_trait]
impl TokenVerifier for KeyVerification {
    async fn verify<'a>(
        &self,
        issuer_did_value: Option<DidValue>,
        issuer_key_id: Option<&'a str>,
        algorithm: KeyAlgorithmType,
        token: &'a [u8],
        signature: &'a [u8],
    ) -> Result<(), SignerError> {
        let issuer =
            issuer_did_value.ok_or(SignerError::CouldNotVerify("Missing issuer".to_string()))?;

        if let Some((did, _)) = issuer_key_id.and_then(|key_id| key_id.split_once('#')) {
            if !did.is_empty() && did != issuer.as_str() {
                return Err(SignerError::CouldNotVerify(format!(
                    "key `{}` is not controlled by `{issuer}`",
                    issuer_key_id.unwrap_or_default()
                )));
            }
        }

        let did_document = self
            .did_resolver
            .resolve(&issuer)
            .await
            .map_err(|e| SignerError::CouldNotVerify(e.to_string()))?;

        let method = match issuer_key_id {
            Some(key_id) => did_document.find_verification_method(key_id),
            None => did_document.default_assertion_method(),
        }
        .ok_or(SignerError::MissingKey)?;

        let jwk = method
            .public_key_jwk
            .as_ref()
            .ok_or(SignerError::CouldNotVerify(format!(
                "Unsupported key type of `{}`",
                method.id
            )))?;

        let parsed = self
            .key_algorithm_provider
            .parse_jwk(jwk)
            .map_err(|e| SignerError::CouldNotVerify(e.to_string()))?;
        if parsed.algorithm != algorithm {
            return Err(SignerError::CouldNotVerify(format!(
                "Key `{}` is {}, signature is {algorithm}",
                method.id, parsed.algorithm
            )));
        }

        let signer = self
            .key_algorithm_provider
            .get_signer(algorithm)
            .map_err(|e| SignerError::CouldNotVerify(e.to_string()))?;

        signer.verify(token, signature, &parsed.public_key_bytes)
    }
}
