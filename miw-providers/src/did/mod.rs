//! DID resolution, consumed when verifying proofs of credentials issued elsewhere
//! and of status-list credentials.

use async_trait::async_trait;

use self::{error::DidResolverError, model::DidDocument};
use crate::common_models::did::DidValue;

pub mod error;
pub mod imp;
pub mod model;

#[cfg_attr(any(test, feature = "mock"), mockall::automock)]
#[async_trait]
pub trait DidResolver: Send + Sync {
    async fn resolve(&self, did: &DidValue) -> Result<DidDocument, DidResolverError>;
}
