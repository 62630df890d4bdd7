//! Credential encoding: JWT envelopes and linked-data proofs.
//!
//! Signing goes through [`model::SignatureProvider`] so that formatters never see
//! private keys; verification goes through [`model::TokenVerifier`], which resolves
//! the issuer key on its own.

pub mod error;
pub mod imp;
pub mod model;
