//! Enumerates errors related to DID resolution.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DidResolverError {
    #[error("Invalid DID `{0}`")]
    InvalidDid(String),
    #[error("Unsupported DID method `{0}`")]
    UnsupportedMethod(String),
    #[error("Could not resolve: `{0}`")]
    ResolutionError(String),
}
