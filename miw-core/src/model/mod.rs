pub mod credential;
pub mod list_query;
pub mod status_list;
pub mod wallet;
