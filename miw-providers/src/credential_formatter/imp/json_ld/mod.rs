//! Data integrity proofs (`eddsa-jcs-2022`) over JSON documents.
//!
//! The signed message is `hash(canonical(proof options)) || hash(canonical(document))`,
//! where the document excludes its `proof` member and the proof options exclude
//! `proofValue`. The signature is stored multibase (base58btc, `z` prefix).

use std::sync::Arc;

use serde_json::Value;

use self::canonicalizer::DocumentCanonicalizer;
use crate::{
    common_models::{
        credential::{LdProof, DATA_INTEGRITY_PROOF_TYPE, EDDSA_JCS_CRYPTOSUITE},
        did::DidValue,
        now_utc,
    },
    credential_formatter::{
        error::FormatterError,
        model::{AuthenticationFn, TokenVerifier},
    },
    crypto::Hasher,
    key_algorithm::KeyAlgorithmType,
};

pub mod canonicalizer;


const PROOF_FIELD: &str = "proof";

pub struct LdProofFormatter {
    hasher: Arc<dyn Hasher>,
    canonicalizer: Arc<dyn DocumentCanonicalizer>,
}

impl LdProofFormatter {
    pub fn new(hasher: Arc<dyn Hasher>, canonicalizer: Arc<dyn DocumentCanonicalizer>) -> Self {
        Self {
            hasher,
            canonicalizer,
        }
    }

    /// Signs `document` and returns the proof to attach under `proof`.
    pub async fn create_proof(
        &self,
        document: &Value,
        proof_purpose: &str,
        challenge: Option<String>,
        auth_fn: &AuthenticationFn,
    ) -> Result<LdProof, FormatterError> {
        let verification_method = auth_fn
            .get_key_id()
            .ok_or_else(|| FormatterError::CouldNotSign("missing key id".to_owned()))?;

        let mut proof = LdProof {
            r#type: DATA_INTEGRITY_PROOF_TYPE.to_owned(),
            cryptosuite: EDDSA_JCS_CRYPTOSUITE.to_owned(),
            created: now_utc(),
            verification_method,
            proof_purpose: proof_purpose.to_owned(),
            proof_value: None,
            challenge,
            domain: None,
        };

        let signing_input = self.signing_input(document, &proof)?;
        let signature = auth_fn
            .sign(&signing_input)
            .await
            .map_err(|e| FormatterError::CouldNotSign(e.to_string()))?;

        proof.proof_value = Some(format!("z{}", bs58::encode(signature).into_string()));
        Ok(proof)
    }

    /// Verifies the embedded proof of `document` against the key of its issuer (or holder).
    pub async fn verify_proof(
        &self,
        document: &Value,
        verifier: &dyn TokenVerifier,
    ) -> Result<(), FormatterError> {
        let proof: LdProof = document
            .get(PROOF_FIELD)
            .cloned()
            .ok_or(FormatterError::MissingProof)
            .and_then(|proof| {
                serde_json::from_value(proof)
                    .map_err(|e| FormatterError::CouldNotVerify(e.to_string()))
            })?;

        if proof.r#type != DATA_INTEGRITY_PROOF_TYPE || proof.cryptosuite != EDDSA_JCS_CRYPTOSUITE {
            return Err(FormatterError::UnsupportedProof(format!(
                "{}/{}",
                proof.r#type, proof.cryptosuite
            )));
        }

        let signer_did = document_signer(document)?;
        let method_did = proof
            .verification_method
            .split('#')
            .next()
            .unwrap_or_default();
        if method_did != signer_did.as_str() {
            return Err(FormatterError::CouldNotVerify(format!(
                "verification method `{}` does not belong to `{signer_did}`",
                proof.verification_method
            )));
        }

        let signature = decode_proof_value(proof.proof_value.as_deref())?;
        let signing_input = self.signing_input(document, &proof)?;

        verifier
            .verify(
                Some(signer_did),
                Some(&proof.verification_method),
                KeyAlgorithmType::Eddsa,
                &signing_input,
                &signature,
            )
            .await
            .map_err(|e| FormatterError::CouldNotVerify(e.to_string()))
    }

    fn signing_input(&self, document: &Value, proof: &LdProof) -> Result<Vec<u8>, FormatterError> {
        let mut unsecured = document.clone();
        if let Value::Object(map) = &mut unsecured {
            map.remove(PROOF_FIELD);
        }

        let mut options = proof.clone();
        options.proof_value = None;
        let options = serde_json::to_value(options)
            .map_err(|e| FormatterError::JsonMapping(e.to_string()))?;

        let proof_hash = self
            .hasher
            .hash(self.canonicalizer.canonicalize(&options)?.as_bytes())?;
        let document_hash = self
            .hasher
            .hash(self.canonicalizer.canonicalize(&unsecured)?.as_bytes())?;

        Ok([proof_hash, document_hash].concat())
    }
}

/// Credentials are signed by their `issuer`, presentations by their `holder`.
fn document_signer(document: &Value) -> Result<DidValue, FormatterError> {
    let signer = document
        .get("issuer")
        .or_else(|| document.get("holder"))
        .ok_or(FormatterError::MissingIssuer)?;

    let did = match signer {
        Value::String(did) => did.as_str(),
        Value::Object(issuer) => issuer
            .get("id")
            .and_then(Value::as_str)
            .ok_or(FormatterError::MissingIssuer)?,
        _ => return Err(FormatterError::MissingIssuer),
    };

    Ok(DidValue::from(did))
}

fn decode_proof_value(proof_value: Option<&str>) -> Result<Vec<u8>, FormatterError> {
    let encoded = proof_value
        .and_then(|value| value.strip_prefix('z'))
        .ok_or_else(|| FormatterError::CouldNotVerify("proofValue is not base58btc".to_owned()))?;

    bs58::decode(encoded)
        .into_vec()
        .map_err(|e| FormatterError::CouldNotVerify(e.to_string()))
}
