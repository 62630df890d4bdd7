//! Where a status bit lives.
//!
//! List URL: `{base_url}/api/v1/revocations/credentials/{bpn}/{purpose}/{listNumber}`,
//! entry id: `{listUrl}#{index}`, persistence id: `{bpn}-{purpose}#{listNumber}`.
//! Allocation, revocation and verification all go through [`StatusLocator::parse`].

use std::{str::FromStr, sync::LazyLock};

use regex::Regex;
use thiserror::Error;

use super::model::{StatusEntry, StatusPurpose, STATUS_LIST_ENTRY_TYPE};
use crate::common_models::did::Bpn;

const LIST_PATH: &str = "/api/v1/revocations/credentials";

static LOCATOR_REGEX: LazyLock<Result<Regex, regex::Error>> = LazyLock::new(|| {
    Regex::new(
        r"^(?<base>.+)/api/v1/revocations/credentials/(?<bpn>[^/#]+)/(?<purpose>[^/#]+)/(?<list>\d+)(?:#(?<index>\d+))?$",
    )
});

#[derive(Debug, Error, PartialEq, Eq)]
pub enum StatusLocatorError {
    #[error("Malformed status list location `{0}`")]
    Malformed(String),
    #[error("Status entry is inconsistent: {0}")]
    Inconsistent(String),
}

/// One generation of the status list of an issuer for a purpose.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct StatusListLocator {
    pub base_url: String,
    pub bpn: Bpn,
    pub purpose: StatusPurpose,
    pub list_number: u32,
}

impl StatusListLocator {
    pub fn new(base_url: &str, bpn: Bpn, purpose: StatusPurpose, list_number: u32) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_owned(),
            bpn,
            purpose,
            list_number,
        }
    }

    pub fn list_url(&self) -> String {
        format!(
            "{}{LIST_PATH}/{}/{}/{}",
            self.base_url, self.bpn, self.purpose, self.list_number
        )
    }

    pub fn list_id(&self) -> String {
        list_id(&self.bpn, self.purpose, self.list_number)
    }

    /// Subject id of the status-list credential.
    pub fn subject_id(&self) -> String {
        format!("{}#list", self.list_url())
    }

    pub fn at(self, index: usize) -> StatusLocator {
        StatusLocator { list: self, index }
    }

    /// Parses a list URL; a fragment is rejected.
    pub fn parse(url: &str) -> Result<Self, StatusLocatorError> {
        match StatusLocator::parse_parts(url)? {
            (list, None) => Ok(list),
            (_, Some(_)) => Err(StatusLocatorError::Malformed(url.to_owned())),
        }
    }
}

/// A single bit of a status list.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct StatusLocator {
    pub list: StatusListLocator,
    pub index: usize,
}

impl StatusLocator {
    pub fn entry_id(&self) -> String {
        format!("{}#{}", self.list.list_url(), self.index)
    }

    pub fn to_entry(&self) -> StatusEntry {
        StatusEntry {
            id: self.entry_id(),
            r#type: STATUS_LIST_ENTRY_TYPE.to_owned(),
            status_purpose: self.list.purpose,
            status_list_index: self.index.to_string(),
            status_list_credential: self.list.list_url(),
        }
    }

    /// Parses an entry id; the `#index` fragment is required.
    pub fn parse(entry_id: &str) -> Result<Self, StatusLocatorError> {
        match Self::parse_parts(entry_id)? {
            (list, Some(index)) => Ok(list.at(index)),
            (_, None) => Err(StatusLocatorError::Malformed(entry_id.to_owned())),
        }
    }

    /// Parses a `credentialStatus` entry, cross-checking its id, list URL, index and purpose.
    pub fn parse_entry(entry: &StatusEntry) -> Result<Self, StatusLocatorError> {
        let locator = Self::parse(&entry.id)?;
        let list = StatusListLocator::parse(&entry.status_list_credential)?;

        if list != locator.list {
            return Err(StatusLocatorError::Inconsistent(format!(
                "id `{}` does not point into `{}`",
                entry.id, entry.status_list_credential
            )));
        }

        let index = usize::from_str(&entry.status_list_index)
            .map_err(|_| StatusLocatorError::Malformed(entry.status_list_index.to_owned()))?;
        if index != locator.index {
            return Err(StatusLocatorError::Inconsistent(format!(
                "index {index} does not match id `{}`",
                entry.id
            )));
        }

        if entry.status_purpose != locator.list.purpose {
            return Err(StatusLocatorError::Inconsistent(format!(
                "purpose `{}` does not match id `{}`",
                entry.status_purpose, entry.id
            )));
        }

        Ok(locator)
    }

    fn parse_parts(value: &str) -> Result<(StatusListLocator, Option<usize>), StatusLocatorError> {
        let malformed = || StatusLocatorError::Malformed(value.to_owned());

        let regex = LOCATOR_REGEX
            .as_ref()
            .map_err(|e| StatusLocatorError::Malformed(e.to_string()))?;
        let captures = regex.captures(value).ok_or_else(malformed)?;
        let purpose = StatusPurpose::from_str(&captures["purpose"]).map_err(|_| malformed())?;
        let list_number = u32::from_str(&captures["list"]).map_err(|_| malformed())?;
        let index = captures
            .name("index")
            .map(|index| usize::from_str(index.as_str()))
            .transpose()
            .map_err(|_| malformed())?;

        Ok((
            StatusListLocator::new(
                &captures["base"],
                Bpn::from(&captures["bpn"]),
                purpose,
                list_number,
            ),
            index,
        ))
    }
}

pub fn list_id(bpn: &Bpn, purpose: StatusPurpose, list_number: u32) -> String {
    format!("{bpn}-{purpose}#{list_number}")
}

#[cfg(test)]
mod test {
    use super::*;

    const LIST_URL: &str =
        "https://miw.example.com/api/v1/revocations/credentials/BPNL000000000000/revocation/1";

    fn locator() -> StatusLocator {
        StatusListLocator::new(
            "https://miw.example.com/",
            Bpn::from("BPNL000000000000"),
            StatusPurpose::Revocation,
            1,
        )
        .at(42)
    }

    #[test]
    fn test_format() {
        let locator = locator();
        assert_eq!(LIST_URL, locator.list.list_url());
        assert_eq!(format!("{LIST_URL}#42"), locator.entry_id());
        assert_eq!(format!("{LIST_URL}#list"), locator.list.subject_id());
        assert_eq!("BPNL000000000000-revocation#1", locator.list.list_id());
    }

    #[test]
    fn test_entry_round_trip() {
        let entry = locator().to_entry();
        assert_eq!("42", entry.status_list_index);
        assert_eq!(STATUS_LIST_ENTRY_TYPE, entry.r#type);

        assert_eq!(locator(), StatusLocator::parse_entry(&entry).unwrap());
    }

    #[test]
    fn test_parse_with_port_and_suspension() {
        let locator = StatusLocator::parse(
            "http://localhost:8080/api/v1/revocations/credentials/BPNL000000000001/suspension/3#0",
        )
        .unwrap();

        assert_eq!("http://localhost:8080", locator.list.base_url);
        assert_eq!(Bpn::from("BPNL000000000001"), locator.list.bpn);
        assert_eq!(StatusPurpose::Suspension, locator.list.purpose);
        assert_eq!(3, locator.list.list_number);
        assert_eq!(0, locator.index);
    }

    #[test]
    fn test_parse_rejects_malformed() {
        for value in [
            "",
            "https://miw.example.com/status/1#1",
            "https://miw.example.com/api/v1/revocations/credentials/BPNL000000000000/unknown/1#1",
            "https://miw.example.com/api/v1/revocations/credentials/BPNL000000000000/revocation/x#1",
            "https://miw.example.com/api/v1/revocations/credentials/BPNL000000000000/revocation/1#-1",
        ] {
            assert!(
                matches!(StatusLocator::parse(value), Err(StatusLocatorError::Malformed(_))),
                "{value}"
            );
        }

        assert!(StatusLocator::parse(LIST_URL).is_err());
        assert!(StatusListLocator::parse(&format!("{LIST_URL}#1")).is_err());
    }

    #[test]
    fn test_parse_entry_cross_checks() {
        let mut entry = locator().to_entry();
        entry.status_list_index = "41".to_string();
        assert!(matches!(
            StatusLocator::parse_entry(&entry),
            Err(StatusLocatorError::Inconsistent(_))
        ));

        let mut entry = locator().to_entry();
        entry.status_list_credential = entry.status_list_credential.replace("/1", "/2");
        assert!(matches!(
            StatusLocator::parse_entry(&entry),
            Err(StatusLocatorError::Inconsistent(_))
        ));

        let mut entry = locator().to_entry();
        entry.status_purpose = StatusPurpose::Suspension;
        assert!(matches!(
            StatusLocator::parse_entry(&entry),
            Err(StatusLocatorError::Inconsistent(_))
        ));
    }
}
