//! Key algorithm representations and signer lookup.
//!
//! Converts public keys between raw bytes and JWK, and decides which
//! credential encodings an algorithm can be used with.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use self::error::KeyAlgorithmError;
use self::model::GeneratedKey;
use crate::common_models::PublicKeyJwk;
use crate::credential_formatter::model::CredentialEncoding;

pub mod error;
pub mod imp;
pub mod model;
pub mod provider;

#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Display,
    EnumString,
    Serialize,
    Deserialize,
)]
pub enum KeyAlgorithmType {
    #[strum(serialize = "EDDSA")]
    #[serde(rename = "EDDSA")]
    Eddsa,
    #[strum(serialize = "ES256")]
    #[serde(rename = "ES256")]
    Es256,
}

impl KeyAlgorithmType {
    /// EdDSA keys sign both encodings; the ECDSA family is only wired for JWT.
    pub fn supported_encodings(&self) -> &'static [CredentialEncoding] {
        match self {
            Self::Eddsa => &[CredentialEncoding::JsonLd, CredentialEncoding::Jwt],
            Self::Es256 => &[CredentialEncoding::Jwt],
        }
    }

    pub fn supports(&self, encoding: CredentialEncoding) -> bool {
        self.supported_encodings().contains(&encoding)
    }

    /// The JOSE `alg` header value.
    pub fn jose_alg(&self) -> &'static str {
        match self {
            Self::Eddsa => "EdDSA",
            Self::Es256 => "ES256",
        }
    }

    pub fn from_jose_alg(alg: &str) -> Option<Self> {
        match alg {
            "EdDSA" | "EDDSA" => Some(Self::Eddsa),
            "ES256" => Some(Self::Es256),
            _ => None,
        }
    }
}

/// Find signer IDs and convert key representations.
#[cfg_attr(any(test, feature = "mock"), mockall::automock)]
pub trait KeyAlgorithm: Send + Sync {
    /// Finds related crypto signer ID.
    fn get_signer_algorithm_id(&self) -> String;

    /// Generates a new in-memory key-pair.
    fn generate_key_pair(&self) -> GeneratedKey;

    /// Converts public key bytes to JWK.
    fn bytes_to_jwk(&self, bytes: &[u8]) -> Result<PublicKeyJwk, KeyAlgorithmError>;

    /// Converts JWK to key bytes.
    fn jwk_to_bytes(&self, jwk: &PublicKeyJwk) -> Result<Vec<u8>, KeyAlgorithmError>;
}
