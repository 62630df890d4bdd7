use std::sync::Arc;

use async_trait::async_trait;

use crate::{
    common_models::credential::{
        SignedCredential, SignedPresentation, VerifiableCredential, VerifiablePresentation,
        ASSERTION_METHOD_PURPOSE, AUTHENTICATION_PURPOSE,
    },
    credential_formatter::{
        imp::{
            json_ld::{
                canonicalizer::{DocumentCanonicalizer, JcsCanonicalizer},
                LdProofFormatter,
            },
            jwt::Jwt,
        },
        model::{AuthenticationFn, CredentialEncoding, SignatureProvider},
    },
    crypto::{imp::hasher::sha256::SHA256, Hasher, Signer, SignerError},
    key_algorithm::provider::KeyAlgorithmProvider,
    key_storage::KeyProvider,
    signing::{ensure_supported, error::SigningServiceError, KeyReference, SigningService},
};


/// Signs with keys fetched from a [`KeyProvider`] at signing time.
pub struct LocalSigningService {
    key_provider: Arc<dyn KeyProvider>,
    key_algorithm_provider: Arc<dyn KeyAlgorithmProvider>,
    ld_formatter: LdProofFormatter,
}

#[derive(Default)]
pub struct LocalSigningServiceBuilder {
    key_provider: Option<Arc<dyn KeyProvider>>,
    key_algorithm_provider: Option<Arc<dyn KeyAlgorithmProvider>>,
    hasher: Option<Arc<dyn Hasher>>,
    canonicalizer: Option<Arc<dyn DocumentCanonicalizer>>,
}

impl LocalSigningServiceBuilder {
    pub fn key_provider(mut self, key_provider: Arc<dyn KeyProvider>) -> Self {
        self.key_provider = Some(key_provider);
        self
    }

    pub fn key_algorithm_provider(
        mut self,
        key_algorithm_provider: Arc<dyn KeyAlgorithmProvider>,
    ) -> Self {
        self.key_algorithm_provider = Some(key_algorithm_provider);
        self
    }

    /// Defaults to SHA-256.
    pub fn hasher(mut self, hasher: Arc<dyn Hasher>) -> Self {
        self.hasher = Some(hasher);
        self
    }

    /// Defaults to [`JcsCanonicalizer`].
    pub fn canonicalizer(mut self, canonicalizer: Arc<dyn DocumentCanonicalizer>) -> Self {
        self.canonicalizer = Some(canonicalizer);
        self
    }

    pub fn build(self) -> Result<LocalSigningService, SigningServiceError> {
        let key_provider = self.key_provider.ok_or_else(|| {
            SigningServiceError::Configuration("key provider is required".to_owned())
        })?;
        let key_algorithm_provider = self.key_algorithm_provider.ok_or_else(|| {
            SigningServiceError::Configuration("key algorithm provider is required".to_owned())
        })?;

        Ok(LocalSigningService {
            key_provider,
            key_algorithm_provider,
            ld_formatter: LdProofFormatter::new(
                self.hasher.unwrap_or_else(|| Arc::new(SHA256 {})),
                self.canonicalizer.unwrap_or_else(|| Arc::new(JcsCanonicalizer)),
            ),
        })
    }
}

impl LocalSigningService {
    pub fn builder() -> LocalSigningServiceBuilder {
        LocalSigningServiceBuilder::default()
    }

    async fn auth_fn(&self, key: &KeyReference) -> Result<AuthenticationFn, SigningServiceError> {
        let signer = self.key_algorithm_provider.get_signer(key.algorithm)?;
        let key_id = self
            .key_provider
            .get_key_id(&key.key_name, key.algorithm)
            .await?;
        let public_key = self
            .key_provider
            .get_public_key(&key.key_name, key.algorithm)
            .await?;

        Ok(Box::new(KeyProviderSignature {
            key_provider: self.key_provider.clone(),
            signer,
            key: key.to_owned(),
            key_id,
            public_key,
        }))
    }

    async fn sign_ld_credential(
        &self,
        mut credential: VerifiableCredential,
        auth_fn: &AuthenticationFn,
    ) -> Result<VerifiableCredential, SigningServiceError> {
        credential.proof = None;
        let document = serde_json::to_value(&credential)?;

        let proof = self
            .ld_formatter
            .create_proof(&document, ASSERTION_METHOD_PURPOSE, None, auth_fn)
            .await?;

        credential.proof = Some(proof);
        Ok(credential)
    }
}

#[async_trait]
impl SigningService for LocalSigningService {
    async fn sign_credential(
        &self,
        credential: VerifiableCredential,
        key: &KeyReference,
        encoding: CredentialEncoding,
    ) -> Result<SignedCredential, SigningServiceError> {
        ensure_supported(key.algorithm, encoding)?;
        let auth_fn = self.auth_fn(key).await?;

        match encoding {
            CredentialEncoding::JsonLd => Ok(SignedCredential::LinkedData(
                self.sign_ld_credential(credential, &auth_fn).await?,
            )),
            CredentialEncoding::Jwt => {
                let token = Jwt::from_credential(
                    credential.clone(),
                    key.algorithm,
                    auth_fn.get_key_id(),
                )
                .tokenize(&auth_fn)
                .await?;
                Ok(SignedCredential::Jwt { token, credential })
            }
        }
    }

    async fn sign_presentation(
        &self,
        mut presentation: VerifiablePresentation,
        key: &KeyReference,
        encoding: CredentialEncoding,
        challenge: Option<String>,
    ) -> Result<SignedPresentation, SigningServiceError> {
        ensure_supported(key.algorithm, encoding)?;
        let auth_fn = self.auth_fn(key).await?;

        match encoding {
            CredentialEncoding::JsonLd => {
                presentation.proof = None;
                let document = serde_json::to_value(&presentation)?;
                let proof = self
                    .ld_formatter
                    .create_proof(&document, AUTHENTICATION_PURPOSE, challenge, &auth_fn)
                    .await?;
                presentation.proof = Some(proof);
                Ok(SignedPresentation::LinkedData(presentation))
            }
            CredentialEncoding::Jwt => {
                let token = Jwt::from_presentation(
                    presentation.clone(),
                    key.algorithm,
                    auth_fn.get_key_id(),
                    challenge,
                )
                .tokenize(&auth_fn)
                .await?;
                Ok(SignedPresentation::Jwt {
                    token,
                    presentation,
                })
            }
        }
    }

    async fn sign_status_list(
        &self,
        credential: VerifiableCredential,
        key: &KeyReference,
        _token: Option<String>,
    ) -> Result<VerifiableCredential, SigningServiceError> {
        ensure_supported(key.algorithm, CredentialEncoding::JsonLd)?;
        let auth_fn = self.auth_fn(key).await?;

        self.sign_ld_credential(credential, &auth_fn).await
    }
}

/// Unseals the private key only for the duration of a single signature.
struct KeyProviderSignature {
    key_provider: Arc<dyn KeyProvider>,
    signer: Arc<dyn Signer>,
    key: KeyReference,
    key_id: String,
    public_key: Vec<u8>,
}

#[async_trait]
impl SignatureProvider for KeyProviderSignature {
    async fn sign(&self, message: &[u8]) -> Result<Vec<u8>, SignerError> {
        let private_key = self
            .key_provider
            .get_private_key(&self.key.key_name, self.key.algorithm)
            .await
            .map_err(|_| SignerError::MissingKey)?;

        self.signer.sign(message, &self.public_key, &private_key)
    }

    fn get_key_id(&self) -> Option<String> {
        Some(self.key_id.to_owned())
    }

    fn get_public_key(&self) -> Vec<u8> {
        self.public_key.to_owned()
    }
}
