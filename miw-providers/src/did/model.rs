use serde::{Deserialize, Deserializer, Serialize};
use serde_with::skip_serializing_none;

use crate::common_models::{did::DidValue, PublicKeyJwk};

pub const DID_CONTEXT: &str = "https://www.w3.org/ns/did/v1";
pub const JWS_2020_CONTEXT: &str = "https://w3id.org/security/suites/jws-2020/v1";
pub const JSON_WEB_KEY_2020: &str = "JsonWebKey2020";

#[skip_serializing_none]
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DidDocument {
    #[serde(rename = "@context")]
    pub context: serde_json::Value,
    pub id: DidValue,
    #[serde(default)]
    pub verification_method: Vec<DidVerificationMethod>,
    pub authentication: Option<Vec<String>>,
    pub assertion_method: Option<Vec<String>>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DidVerificationMethod {
    pub id: String,
    pub r#type: String,
    pub controller: String,
    /// `None` for key types this wallet cannot verify with.
    #[serde(
        default,
        deserialize_with = "lenient_jwk",
        skip_serializing_if = "Option::is_none"
    )]
    pub public_key_jwk: Option<PublicKeyJwk>,
}

impl DidDocument {
    /// Looks up a verification method by its full id, or by fragment (`#key-1`).
    pub fn find_verification_method(&self, key_id: &str) -> Option<&DidVerificationMethod> {
        let fragment = key_id.rsplit_once('#').map(|(_, fragment)| fragment);

        self.verification_method.iter().find(|method| {
            method.id == key_id
                || fragment.is_some_and(|fragment| {
                    method.id.rsplit_once('#').map(|(_, f)| f) == Some(fragment)
                })
        })
    }

    /// The first method listed under `assertionMethod`, or the first method at all.
    pub fn default_assertion_method(&self) -> Option<&DidVerificationMethod> {
        self.assertion_method
            .as_ref()
            .and_then(|ids| ids.first())
            .and_then(|id| self.find_verification_method(id))
            .or_else(|| self.verification_method.first())
    }
}

fn lenient_jwk<'de, D>(deserializer: D) -> Result<Option<PublicKeyJwk>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(value.and_then(|value| serde_json::from_value(value).ok()))
}

#[cfg(test)]
mod test {
    use serde_json::json;

    use super::*;

    fn document() -> DidDocument {
        serde_json::from_value(json!({
            "@context": [DID_CONTEXT],
            "id": "did:web:localhost:BPNL000000000000",
            "verificationMethod": [
                {
                    "id": "did:web:localhost:BPNL000000000000#rsa",
                    "type": JSON_WEB_KEY_2020,
                    "controller": "did:web:localhost:BPNL000000000000",
                    "publicKeyJwk": { "kty": "RSA", "e": "AQAB", "n": "omws" }
                },
                {
                    "id": "did:web:localhost:BPNL000000000000#key-1",
                    "type": JSON_WEB_KEY_2020,
                    "controller": "did:web:localhost:BPNL000000000000",
                    "publicKeyJwk": {
                        "kty": "OKP",
                        "crv": "Ed25519",
                        "x": "m7AE5UQdjLuCOnZHB1gCFfo2uvhM6W_4xFmpJK02r7s"
                    }
                }
            ],
            "assertionMethod": ["did:web:localhost:BPNL000000000000#key-1"]
        }))
        .unwrap()
    }

    #[test]
    fn test_unsupported_key_type_is_kept_without_jwk() {
        let document = document();

        assert_eq!(2, document.verification_method.len());
        assert!(document.verification_method[0].public_key_jwk.is_none());
        assert!(document.verification_method[1].public_key_jwk.is_some());
    }

    #[test]
    fn test_find_verification_method() {
        let document = document();

        assert_eq!(
            "did:web:localhost:BPNL000000000000#key-1",
            document
                .find_verification_method("did:web:localhost:BPNL000000000000#key-1")
                .unwrap()
                .id
        );
        assert!(document.find_verification_method("#key-1").is_some());
        assert!(document.find_verification_method("#key-9").is_none());
        assert_eq!(
            "did:web:localhost:BPNL000000000000#key-1",
            document.default_assertion_method().unwrap().id
        );
    }
}
