use std::fmt::Debug;

use ct_codecs::{Base64UrlSafeNoPadding, Decoder};
use serde::{de::DeserializeOwned, Serialize};

use self::{
    mapper::{bin_to_b64url_string, json_from_decoded, string_to_b64url_string},
    model::{DecomposedToken, JWTHeader, JWTPayload, VcClaim, VpClaim},
};
use crate::{
    common_models::{
        credential::{VerifiableCredential, VerifiablePresentation},
        did::DidValue,
    },
    credential_formatter::{
        error::FormatterError,
        model::{AuthenticationFn, TokenVerifier},
    },
    key_algorithm::KeyAlgorithmType,
};


pub mod mapper;
pub mod model;

pub const JWT_TYPE: &str = "JWT";

#[derive(Debug)]
pub struct Jwt<Payload: Serialize + DeserializeOwned + Debug> {
    pub header: JWTHeader,
    pub payload: JWTPayload<Payload>,
}

impl<Payload: Serialize + DeserializeOwned + Debug> Jwt<Payload> {
    pub fn new(
        algorithm: KeyAlgorithmType,
        key_id: Option<String>,
        payload: JWTPayload<Payload>,
    ) -> Jwt<Payload> {
        let header = JWTHeader {
            signature_type: Some(JWT_TYPE.to_owned()),
            algorithm: algorithm.jose_alg().to_owned(),
            key_id,
        };

        Jwt { header, payload }
    }

    /// Parses a compact token, verifying its signature when a verifier is given.
    pub async fn build_from_token(
        token: &str,
        verification: Option<&dyn TokenVerifier>,
    ) -> Result<Jwt<Payload>, FormatterError> {
        let DecomposedToken {
            header,
            header_json,
            payload,
            payload_json,
            signature,
        } = Jwt::decompose_token(token)?;

        if let Some(verification) = verification {
            let algorithm = KeyAlgorithmType::from_jose_alg(&header.algorithm).ok_or_else(|| {
                FormatterError::CouldNotVerify(format!(
                    "unsupported algorithm `{}`",
                    header.algorithm
                ))
            })?;

            let signing_input = format!(
                "{}.{}",
                string_to_b64url_string(&header_json)?,
                string_to_b64url_string(&payload_json)?,
            );

            verification
                .verify(
                    payload.issuer.as_ref().map(|v| DidValue::from(v.clone())),
                    header.key_id.as_deref(),
                    algorithm,
                    signing_input.as_bytes(),
                    &signature,
                )
                .await
                .map_err(|e| FormatterError::CouldNotVerify(e.to_string()))?;
        }

        Ok(Jwt { header, payload })
    }

    pub async fn tokenize(&self, auth_fn: &AuthenticationFn) -> Result<String, FormatterError> {
        let jwt_header_json = serde_json::to_string(&self.header)
            .map_err(|e| FormatterError::CouldNotFormat(e.to_string()))?;
        let payload_json = serde_json::to_string(&self.payload)
            .map_err(|e| FormatterError::CouldNotFormat(e.to_string()))?;
        let mut token = format!(
            "{}.{}",
            string_to_b64url_string(&jwt_header_json)?,
            string_to_b64url_string(&payload_json)?,
        );

        let signature = auth_fn
            .sign(token.as_bytes())
            .await
            .map_err(|e| FormatterError::CouldNotSign(e.to_string()))?;

        token.push('.');
        token.push_str(&bin_to_b64url_string(&signature)?);

        Ok(token)
    }

    pub fn decompose_token(token: &str) -> Result<DecomposedToken<Payload>, FormatterError> {
        let token = token.trim_matches(|c: char| c == '.' || c.is_whitespace());
        let mut jwt_parts = token.splitn(3, '.');

        let (Some(header), Some(payload), Some(signature)) =
            (jwt_parts.next(), jwt_parts.next(), jwt_parts.next())
        else {
            return Err(FormatterError::CouldNotExtractCredentials(
                "Missing token part".to_owned(),
            ));
        };

        let header_decoded = Base64UrlSafeNoPadding::decode_to_vec(header, None)
            .map_err(|e| FormatterError::CouldNotExtractCredentials(e.to_string()))?;

        let header: JWTHeader = serde_json::from_slice(&header_decoded)
            .map_err(|e| FormatterError::CouldNotExtractCredentials(e.to_string()))?;

        let payload_decoded = Base64UrlSafeNoPadding::decode_to_vec(payload, None)
            .map_err(|e| FormatterError::CouldNotExtractCredentials(e.to_string()))?;

        let payload: JWTPayload<Payload> = serde_json::from_slice(&payload_decoded)
            .map_err(|e| FormatterError::CouldNotExtractCredentials(e.to_string()))?;

        let signature = Base64UrlSafeNoPadding::decode_to_vec(signature, None)
            .map_err(|e| FormatterError::CouldNotExtractCredentials(e.to_string()))?;

        Ok(DecomposedToken {
            header,
            header_json: json_from_decoded(header_decoded)?,
            payload,
            payload_json: json_from_decoded(payload_decoded)?,
            signature,
        })
    }
}

impl Jwt<VcClaim> {
    /// Wraps a credential into registered claims plus `vc`.
    pub fn from_credential(
        credential: VerifiableCredential,
        algorithm: KeyAlgorithmType,
        key_id: Option<String>,
    ) -> Self {
        let subject = credential
            .credential_subject
            .first()
            .and_then(|subject| subject.get("id"))
            .and_then(|id| id.as_str())
            .map(ToOwned::to_owned);

        let payload = JWTPayload {
            issued_at: Some(credential.issuance_date),
            expires_at: credential.expiration_date,
            invalid_before: Some(credential.issuance_date),
            issuer: Some(credential.issuer.to_string()),
            subject,
            jwt_id: credential.id.clone(),
            nonce: None,
            custom: VcClaim { vc: credential },
        };

        Self::new(algorithm, key_id, payload)
    }
}

impl Jwt<VpClaim> {
    pub fn from_presentation(
        presentation: VerifiablePresentation,
        algorithm: KeyAlgorithmType,
        key_id: Option<String>,
        audience_nonce: Option<String>,
    ) -> Self {
        let holder = presentation.holder.as_ref().map(ToString::to_string);
        let now = crate::common_models::now_utc();

        let payload = JWTPayload {
            issued_at: Some(now),
            expires_at: None,
            invalid_before: Some(now),
            issuer: holder.clone(),
            subject: holder,
            jwt_id: presentation.id.clone(),
            nonce: audience_nonce,
            custom: VpClaim { vp: presentation },
        };

        Self::new(algorithm, key_id, payload)
    }
}
