use miw_providers::common_models::did::DidValue;
use strum::{Display, EnumString};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "camelCase")]
pub enum CredentialSortColumn {
    #[default]
    CreatedAt,
    Issuer,
    Holder,
    Type,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

/// Filter, sort and page of a ledger query. Filters left `None` match everything.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CredentialQuery {
    pub issuer: Option<DidValue>,
    pub holder: Option<DidValue>,
    /// Matches credentials carrying any of these types.
    pub types: Vec<String>,
    pub credential_id: Option<String>,
    pub sort: CredentialSortColumn,
    pub direction: SortDirection,
    /// Zero based.
    pub page: usize,
    pub page_size: usize,
}

impl CredentialQuery {
    pub const DEFAULT_PAGE_SIZE: usize = 100;
    pub const MAX_PAGE_SIZE: usize = 1000;

    pub fn effective_page_size(&self) -> usize {
        self.page_size.clamp(1, Self::MAX_PAGE_SIZE)
    }
}

impl Default for CredentialQuery {
    fn default() -> Self {
        Self {
            issuer: None,
            holder: None,
            types: vec![],
            credential_id: None,
            sort: CredentialSortColumn::default(),
            direction: SortDirection::default(),
            page: 0,
            page_size: Self::DEFAULT_PAGE_SIZE,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct GetListResponse<T> {
    pub values: Vec<T>,
    pub total_pages: usize,
    pub total_items: usize,
}
