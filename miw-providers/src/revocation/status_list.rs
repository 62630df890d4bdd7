//! The status-list credential: a VC whose single subject carries the encoded bitstring.

use thiserror::Error;
use time::OffsetDateTime;

use super::{
    locator::StatusListLocator,
    model::{StatusPurpose, STATUS_LIST_SUBJECT_TYPE},
};
use crate::common_models::{
    credential::{
        VerifiableCredential, BITSTRING_STATUS_LIST_CONTEXT, CREDENTIALS_V1_CONTEXT,
        STATUS_LIST_CREDENTIAL_TYPE, VERIFIABLE_CREDENTIAL_TYPE,
    },
    did::DidValue,
    subject::{StatusListSubject, SubjectError, TypedSubject},
};

#[derive(Debug, Error)]
pub enum StatusListCredentialError {
    #[error("Not a status list credential")]
    NotAStatusList,
    #[error("Status list subject error: `{0}`")]
    Subject(#[from] SubjectError),
}

/// Unsigned status-list credential for `locator` holding `encoded_list`.
pub fn build_status_list_credential(
    issuer: DidValue,
    locator: &StatusListLocator,
    encoded_list: String,
    issuance_date: OffsetDateTime,
) -> Result<VerifiableCredential, StatusListCredentialError> {
    let subject = TypedSubject::StatusList(StatusListSubject {
        id: locator.subject_id(),
        r#type: STATUS_LIST_SUBJECT_TYPE.to_owned(),
        status_purpose: locator.purpose,
        encoded_list,
    });

    Ok(VerifiableCredential {
        context: vec![
            CREDENTIALS_V1_CONTEXT.to_owned(),
            BITSTRING_STATUS_LIST_CONTEXT.to_owned(),
        ],
        id: Some(locator.list_url()),
        r#type: vec![
            VERIFIABLE_CREDENTIAL_TYPE.to_owned(),
            STATUS_LIST_CREDENTIAL_TYPE.to_owned(),
        ],
        issuer,
        issuance_date,
        expiration_date: None,
        credential_subject: vec![subject.into_map()?],
        credential_status: None,
        proof: None,
    })
}

pub fn extract_status_list(
    credential: &VerifiableCredential,
) -> Result<StatusListSubject, StatusListCredentialError> {
    if !credential.has_type(STATUS_LIST_CREDENTIAL_TYPE) {
        return Err(StatusListCredentialError::NotAStatusList);
    }

    match TypedSubject::from_credential(credential)? {
        TypedSubject::StatusList(subject) => Ok(subject),
        _ => Err(StatusListCredentialError::NotAStatusList),
    }
}

/// Swaps in a new bitstring and drops the proof, leaving the credential ready to be re-signed.
pub fn replace_encoded_list(
    mut credential: VerifiableCredential,
    encoded_list: String,
) -> Result<VerifiableCredential, StatusListCredentialError> {
    let mut subject = extract_status_list(&credential)?;
    subject.encoded_list = encoded_list;

    credential.credential_subject = vec![TypedSubject::StatusList(subject).into_map()?];
    credential.proof = None;
    Ok(credential)
}

/// Purpose of a status-list credential, read without parsing the whole subject.
pub fn status_purpose(credential: &VerifiableCredential) -> Option<StatusPurpose> {
    credential
        .credential_subject
        .first()
        .and_then(|subject| subject.get("statusPurpose"))
        .and_then(|purpose| serde_json::from_value(purpose.to_owned()).ok())
}

#[cfg(test)]
mod test {
    use serde_json::json;
    use time::macros::datetime;

    use super::*;
    use crate::{
        common_models::{credential::LdProof, did::Bpn},
        revocation::bitstring,
    };

    fn locator() -> StatusListLocator {
        StatusListLocator::new(
            "https://miw.example.com",
            Bpn::from("BPNL000000000000"),
            StatusPurpose::Revocation,
            1,
        )
    }

    #[test]
    fn test_build_status_list_credential() {
        let encoded = bitstring::generate_empty(16).unwrap();
        let credential = build_status_list_credential(
            DidValue::from("did:web:miw.example.com:BPNL000000000000"),
            &locator(),
            encoded.clone(),
            datetime!(2024-05-01 10:00 UTC),
        )
        .unwrap();

        assert_eq!(
            json!({
                "@context": [
                    "https://www.w3.org/2018/credentials/v1",
                    "https://w3c.github.io/vc-bitstring-status-list/contexts/v1.jsonld"
                ],
                "id": "https://miw.example.com/api/v1/revocations/credentials/BPNL000000000000/revocation/1",
                "type": ["VerifiableCredential", "BitstringStatusListCredential"],
                "issuer": "did:web:miw.example.com:BPNL000000000000",
                "issuanceDate": "2024-05-01T10:00:00Z",
                "credentialSubject": {
                    "id": "https://miw.example.com/api/v1/revocations/credentials/BPNL000000000000/revocation/1#list",
                    "type": "BitstringStatusList",
                    "statusPurpose": "revocation",
                    "encodedList": encoded
                }
            }),
            serde_json::to_value(&credential).unwrap()
        );
        assert_eq!(Some(StatusPurpose::Revocation), status_purpose(&credential));
    }

    #[test]
    fn test_replace_encoded_list_strips_proof() {
        let mut credential = build_status_list_credential(
            DidValue::from("did:web:miw.example.com:BPNL000000000000"),
            &locator(),
            bitstring::generate_empty(16).unwrap(),
            datetime!(2024-05-01 10:00 UTC),
        )
        .unwrap();
        credential.proof = Some(LdProof {
            r#type: "DataIntegrityProof".to_string(),
            cryptosuite: "eddsa-jcs-2022".to_string(),
            created: datetime!(2024-05-01 10:00 UTC),
            verification_method: "did:web:miw.example.com:BPNL000000000000#key".to_string(),
            proof_purpose: "assertionMethod".to_string(),
            proof_value: Some("z1".to_string()),
            challenge: None,
            domain: None,
        });

        let revoked =
            bitstring::set_bit(&bitstring::generate_empty(16).unwrap(), 3, true, 16).unwrap();
        let updated = replace_encoded_list(credential, revoked.clone()).unwrap();

        assert!(updated.proof.is_none());
        assert_eq!(revoked, extract_status_list(&updated).unwrap().encoded_list);
    }

    #[test]
    fn test_extract_rejects_other_credentials() {
        let credential: VerifiableCredential = serde_json::from_value(json!({
            "@context": ["https://www.w3.org/2018/credentials/v1"],
            "type": ["VerifiableCredential", "MembershipCredential"],
            "issuer": "did:web:miw.example.com:BPNL000000000000",
            "issuanceDate": "2024-05-01T10:00:00Z",
            "credentialSubject": {"id": "did:web:holder", "holderIdentifier": "BPNL1", "memberOf": "Catena-X"}
        }))
        .unwrap();

        assert!(matches!(
            extract_status_list(&credential),
            Err(StatusListCredentialError::NotAStatusList)
        ));
    }
}
