use thiserror::Error;

use crate::model::{FileKind, ModelError};

pub type Result<T> = std::result::Result<T, StoreError>;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("SQLite failure: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("stored document could not be decoded: {0}")]
    SerdeJson(#[from] serde_json::Error),

    #[error("stored timestamp could not be parsed: {0}")]
    Timestamp(#[from] chrono::ParseError),

    #[error("configuration error: {0}")]
    Model(#[from] ModelError),

    #[error("storage I/O failure: {0}")]
    Io(#[from] std::io::Error),

    #[error("{kind} configuration {id} disappeared after insert")]
    Missing { kind: FileKind, id: String },

    #[error("storage lock poisoned")]
    Poisoned,
}
