use thiserror::Error;

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum DataLayerError {
    #[error("Already exists")]
    AlreadyExists,
    #[error("Record was modified concurrently")]
    Conflict,
    #[error("Record not found")]
    RecordNotFound,
    #[error("Database error: `{0}`")]
    Db(String),
}
