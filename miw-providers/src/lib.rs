//! Replaceable capabilities behind the wallet engine.
//!
//! Each module exposes a trait (the seam the engine depends on) together with one
//! or more implementations under `imp`. Pure codecs used by revocation (bitstring,
//! status locator, status-list credential) live in [`revocation`].

pub use miw_crypto as crypto;

pub mod common_models;
pub mod credential_formatter;
pub mod did;
pub mod http_client;
pub mod key_algorithm;
pub mod key_storage;
pub mod revocation;
pub mod signing;
pub mod util;
