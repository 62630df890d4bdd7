use thiserror::Error;

use miw_providers::{
    common_models::subject::SubjectError,
    signing::error::SigningServiceError,
};

use crate::repository::error::DataLayerError;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("{entity} `{id}` not found")]
    NotFound { entity: &'static str, id: String },
    #[error("Access denied: {0}")]
    AccessDenied(String),
    #[error("Holder `{holder}` already holds a `{r#type}` from this issuer")]
    DuplicateCredential { r#type: String, holder: String },
    #[error("Unsupported configuration: {0}")]
    UnsupportedConfiguration(String),
    #[error("Malformed summary credential: {0}")]
    MalformedSummaryCredential(String),
    #[error("Malformed status list: {0}")]
    MalformedStatusList(String),
    #[error("Revocation failed: {0}")]
    RevocationFailure(String),
    #[error("Signature verification failed: {0}")]
    SignatureVerificationFailure(String),
    #[error("Credential `{0}` is expired")]
    Expired(String),
    #[error("Validation error: {0}")]
    Validation(String),
    #[error("Signing error: `{0}`")]
    Signing(SigningServiceError),
    #[error("Persistence error: `{0}`")]
    Persistence(#[from] DataLayerError),
}

/// Coarse classification, enough to pick a transport status code.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    Forbidden,
    Conflict,
    BadRequest,
    Corruption,
    Unavailable,
    Internal,
}

impl ServiceError {
    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::AccessDenied(_) => ErrorKind::Forbidden,
            Self::DuplicateCredential { .. } => ErrorKind::Conflict,
            Self::UnsupportedConfiguration(_) | Self::Expired(_) | Self::Validation(_) => {
                ErrorKind::BadRequest
            }
            Self::MalformedSummaryCredential(_)
            | Self::MalformedStatusList(_)
            | Self::SignatureVerificationFailure(_) => ErrorKind::Corruption,
            Self::RevocationFailure(_) => ErrorKind::Internal,
            Self::Signing(SigningServiceError::Remote { .. })
            | Self::Signing(SigningServiceError::Transport(_)) => ErrorKind::Unavailable,
            Self::Signing(_) => ErrorKind::Internal,
            Self::Persistence(DataLayerError::Conflict | DataLayerError::AlreadyExists) => {
                ErrorKind::Conflict
            }
            Self::Persistence(_) => ErrorKind::Unavailable,
        }
    }

    /// Expected outcomes of a well-formed request; retrying them is pointless and
    /// they do not indicate a fault of the service.
    pub fn is_business_outcome(&self) -> bool {
        matches!(
            self,
            Self::NotFound { .. }
                | Self::AccessDenied(_)
                | Self::DuplicateCredential { .. }
                | Self::Expired(_)
                | Self::Validation(_)
        )
    }
}

impl From<SigningServiceError> for ServiceError {
    fn from(value: SigningServiceError) -> Self {
        match value {
            SigningServiceError::UnsupportedConfiguration { .. } => {
                Self::UnsupportedConfiguration(value.to_string())
            }
            other => Self::Signing(other),
        }
    }
}

impl From<SubjectError> for ServiceError {
    fn from(value: SubjectError) -> Self {
        Self::Validation(value.to_string())
    }
}
