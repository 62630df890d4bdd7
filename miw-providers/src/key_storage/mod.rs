//! Private key custody.
//!
//! A [`KeyProvider`] hands out key material for a named key only for the duration
//! of a signing operation; the bytes are wrapped in [`Zeroizing`] so they are
//! wiped on drop.

use async_trait::async_trait;
use zeroize::Zeroizing;

use self::error::KeyStorageError;
use crate::key_algorithm::KeyAlgorithmType;

pub mod error;
pub mod imp;
pub mod model;

#[cfg_attr(any(test, feature = "mock"), mockall::automock)]
#[async_trait]
pub trait KeyProvider: Send + Sync {
    async fn get_private_key(
        &self,
        key_name: &str,
        algorithm: KeyAlgorithmType,
    ) -> Result<Zeroizing<Vec<u8>>, KeyStorageError>;

    async fn get_public_key(
        &self,
        key_name: &str,
        algorithm: KeyAlgorithmType,
    ) -> Result<Vec<u8>, KeyStorageError>;

    /// The verification method id published in the owner's DID document.
    async fn get_key_id(
        &self,
        key_name: &str,
        algorithm: KeyAlgorithmType,
    ) -> Result<String, KeyStorageError>;
}
