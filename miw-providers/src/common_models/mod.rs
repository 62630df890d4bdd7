use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

pub mod credential;
pub mod did;
pub mod key;
pub mod macros;
pub mod subject;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kty")]
pub enum PublicKeyJwk {
    #[serde(rename = "EC")]
    Ec(PublicKeyJwkEllipticData),
    #[serde(rename = "OKP")]
    Okp(PublicKeyJwkEllipticData),
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicKeyJwkEllipticData {
    #[serde(rename = "use", default, skip_serializing_if = "Option::is_none")]
    pub r#use: Option<String>,
    pub crv: String,
    pub x: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y: Option<String>,
}

/// Current time truncated to whole seconds, the precision credentials are exchanged with.
pub fn now_utc() -> OffsetDateTime {
    let now = OffsetDateTime::now_utc();
    now.replace_nanosecond(0).unwrap_or(now)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_jwk_serde_uses_kty_tag() {
        let jwk: PublicKeyJwk = serde_json::from_value(serde_json::json!({
            "kty": "OKP",
            "crv": "Ed25519",
            "x": "m7AE5UQdjLuCOnZHB1gCFfo2uvhM6W_4xFmpJK02r7s"
        }))
        .unwrap();

        assert_eq!(
            PublicKeyJwk::Okp(PublicKeyJwkEllipticData {
                r#use: None,
                crv: "Ed25519".to_string(),
                x: "m7AE5UQdjLuCOnZHB1gCFfo2uvhM6W_4xFmpJK02r7s".to_string(),
                y: None,
            }),
            jwk
        );

        let value = serde_json::to_value(&jwk).unwrap();
        assert_eq!("OKP", value["kty"]);
        assert!(value.get("y").is_none());
    }
}
