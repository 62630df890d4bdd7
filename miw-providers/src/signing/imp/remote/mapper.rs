use serde::de::DeserializeOwned;

use super::dto::RemoteSignResponseRestDTO;
use crate::signing::error::SigningServiceError;

/// Extracts the signed document; a linked-data answer without `proof` is rejected.
pub(super) fn signed_document<T: DeserializeOwned>(
    response: RemoteSignResponseRestDTO,
) -> Result<T, SigningServiceError> {
    let document = response
        .document
        .ok_or_else(|| SigningServiceError::InvalidResponse("missing document".to_owned()))?;

    if document.get("proof").is_none() {
        return Err(SigningServiceError::InvalidResponse(
            "document carries no proof".to_owned(),
        ));
    }

    serde_json::from_value(document)
        .map_err(|e| SigningServiceError::InvalidResponse(e.to_string()))
}

pub(super) fn signed_token(
    response: RemoteSignResponseRestDTO,
) -> Result<String, SigningServiceError> {
    response
        .jwt
        .filter(|jwt| jwt.split('.').count() == 3)
        .ok_or_else(|| SigningServiceError::InvalidResponse("missing or malformed jwt".to_owned()))
}
