//! Signing facade: turns unsigned credentials and presentations into signed artifacts.
//!
//! A wallet's signing service is chosen by its [`SigningServiceType`]; callers only
//! ever name a key ([`KeyReference`]) and a target [`CredentialEncoding`]. Whether the
//! private key lives in the local encrypted store or behind a remote signer is
//! invisible to them.
//!
//! Algorithm and encoding compatibility is checked up front by [`ensure_supported`];
//! an unsupported pairing is a configuration error, never a fallback.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use self::error::SigningServiceError;
use crate::{
    common_models::credential::{
        SignedCredential, SignedPresentation, VerifiableCredential, VerifiablePresentation,
    },
    credential_formatter::model::CredentialEncoding,
    key_algorithm::KeyAlgorithmType,
};

pub mod error;
pub mod imp;
pub mod provider;

#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
pub enum SigningServiceType {
    #[strum(serialize = "LOCAL")]
    #[serde(rename = "LOCAL")]
    Local,
    #[strum(serialize = "REMOTE")]
    #[serde(rename = "REMOTE")]
    Remote,
}

/// Names a key without exposing it.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeyReference {
    pub key_name: String,
    pub algorithm: KeyAlgorithmType,
}

#[cfg_attr(any(test, feature = "mock"), mockall::automock)]
#[async_trait]
pub trait SigningService: Send + Sync {
    /// Signs with an `assertionMethod` proof or as a JWT with the credential under `vc`.
    async fn sign_credential(
        &self,
        credential: VerifiableCredential,
        key: &KeyReference,
        encoding: CredentialEncoding,
    ) -> Result<SignedCredential, SigningServiceError>;

    /// Signs with an `authentication` proof or as a JWT with the presentation under `vp`.
    async fn sign_presentation(
        &self,
        presentation: VerifiablePresentation,
        key: &KeyReference,
        encoding: CredentialEncoding,
        challenge: Option<String>,
    ) -> Result<SignedPresentation, SigningServiceError>;

    /// Re-signs a status-list credential. Any previous proof is discarded first.
    ///
    /// `token` authorizes the call against a remote signer; local signing ignores it.
    async fn sign_status_list(
        &self,
        credential: VerifiableCredential,
        key: &KeyReference,
        token: Option<String>,
    ) -> Result<VerifiableCredential, SigningServiceError>;
}

pub fn ensure_supported(
    algorithm: KeyAlgorithmType,
    encoding: CredentialEncoding,
) -> Result<(), SigningServiceError> {
    if algorithm.supports(encoding) {
        Ok(())
    } else {
        Err(SigningServiceError::UnsupportedConfiguration {
            algorithm,
            encoding,
        })
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_ensure_supported() {
        assert!(ensure_supported(KeyAlgorithmType::Eddsa, CredentialEncoding::JsonLd).is_ok());
        assert!(ensure_supported(KeyAlgorithmType::Eddsa, CredentialEncoding::Jwt).is_ok());
        assert!(ensure_supported(KeyAlgorithmType::Es256, CredentialEncoding::Jwt).is_ok());
        assert!(matches!(
            ensure_supported(KeyAlgorithmType::Es256, CredentialEncoding::JsonLd),
            Err(SigningServiceError::UnsupportedConfiguration {
                algorithm: KeyAlgorithmType::Es256,
                encoding: CredentialEncoding::JsonLd,
            })
        ));
    }
}
