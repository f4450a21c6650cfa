use thiserror::Error;

use super::FileKind;

pub type Result<T> = std::result::Result<T, ModelError>;

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("unsupported file kind: {0}")]
    UnsupportedKind(String),

    #[error("invalid configuration payload: {0}")]
    InvalidPayload(String),

    #[error("configuration kind mismatch: expected {expected}, found {found}")]
    KindMismatch { expected: FileKind, found: FileKind },

    #[error("record serialization failure: {0}")]
    SerdeJson(#[from] serde_json::Error),
}
