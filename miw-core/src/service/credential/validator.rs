use serde_json::Value;

use miw_providers::{
    common_models::credential::VerifiableCredential,
    credential_formatter::{
        imp::{
            json_ld::LdProofFormatter,
            jwt::{model::VcClaim, Jwt},
        },
        model::TokenVerifier,
    },
};

use crate::service::error::ServiceError;

/// A presented credential: a JSON-LD document carrying its proof, or a compact JWT.
pub(super) enum Presented<'a> {
    LinkedData(&'a Value),
    Jwt(&'a str),
}

impl<'a> Presented<'a> {
    pub(super) fn from_value(value: &'a Value) -> Result<Self, ServiceError> {
        match value {
            Value::String(token) => Ok(Self::Jwt(token)),
            Value::Object(_) => Ok(Self::LinkedData(value)),
            _ => Err(ServiceError::Validation(
                "credential must be a JSON object or a JWT".to_owned(),
            )),
        }
    }

    /// The credential as claimed, before any signature check.
    pub(super) fn credential(&self) -> Result<VerifiableCredential, ServiceError> {
        match self {
            Self::LinkedData(document) => serde_json::from_value((*document).to_owned())
                .map_err(|e| ServiceError::Validation(format!("malformed credential: {e}"))),
            Self::Jwt(token) => Jwt::<VcClaim>::decompose_token(token)
                .map(|decomposed| decomposed.payload.custom.vc)
                .map_err(|e| ServiceError::Validation(format!("malformed credential: {e}"))),
        }
    }

    /// `false` for any proof that does not verify against the issuer's DID document.
    pub(super) async fn verify_signature(
        &self,
        ld_formatter: &LdProofFormatter,
        verifier: &dyn TokenVerifier,
    ) -> bool {
        let result = match self {
            Self::LinkedData(document) => ld_formatter.verify_proof(document, verifier).await,
            Self::Jwt(token) => Jwt::<VcClaim>::build_from_token(token, Some(verifier))
                .await
                .map(|_| ()),
        };

        match result {
            Ok(()) => true,
            Err(error) => {
                tracing::warn!("credential signature rejected: {error}");
                false
            }
        }
    }
}
