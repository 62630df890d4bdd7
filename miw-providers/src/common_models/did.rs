use serde::{Deserialize, Serialize};
use strum::Display;

use super::macros::{impl_display, impl_from, impl_into, impl_str};

#[derive(Debug, Clone, Eq, PartialEq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
#[repr(transparent)]
pub struct DidValue(String);
impl_display!(DidValue);
impl_from!(DidValue; String);
impl_into!(DidValue; String);
impl_str!(DidValue);

impl DidValue {
    /// The DID method, `web` for `did:web:example.com`.
    pub fn method(&self) -> Option<&str> {
        let mut parts = self.0.splitn(3, ':');
        match (parts.next(), parts.next(), parts.next()) {
            (Some("did"), Some(method), Some(_)) => Some(method),
            _ => None,
        }
    }
}

/// Business partner number, the human facing identifier of a participant.
#[derive(Debug, Clone, Eq, PartialEq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
#[repr(transparent)]
pub struct Bpn(String);
impl_display!(Bpn);
impl_from!(Bpn; String);
impl_into!(Bpn; String);
impl_str!(Bpn);

#[derive(Clone, Debug, Eq, PartialEq, Display, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum KeyRole {
    Authentication,
    AssertionMethod,
    KeyAgreement,
    CapabilityInvocation,
    CapabilityDelegation,
}
