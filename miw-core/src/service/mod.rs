pub mod credential;
pub mod error;
pub mod revocation;
pub mod wallet;
