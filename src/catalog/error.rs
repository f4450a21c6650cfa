use thiserror::Error;

use crate::model::FileKind;

pub type Result<T> = std::result::Result<T, CatalogError>;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Patient with ID {0} not found")]
    PatientNotFound(String),

    #[error("File with ID {0} not found")]
    FileNotFound(String),

    #[error("File with ID {id} is a {actual}, not a {requested}")]
    WrongKind {
        id: String,
        requested: FileKind,
        actual: FileKind,
    },

    #[error("duplicate file id in catalog: {0}")]
    DuplicateFile(String),
}

impl CatalogError {
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            CatalogError::PatientNotFound(_)
                | CatalogError::FileNotFound(_)
                | CatalogError::WrongKind { .. }
        )
    }
}
