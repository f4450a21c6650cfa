use thiserror::Error;

use crate::api::ClientError;
use crate::catalog::CatalogError;
use crate::model::ModelError;
use crate::session::SessionError;
use crate::store::StoreError;

pub type Result<T> = std::result::Result<T, AppError>;

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("settings I/O failure: {0}")]
    Io(#[from] std::io::Error),

    #[error("settings JSON parse failure: {0}")]
    SerdeJson(#[from] serde_json::Error),

    #[error("settings YAML parse failure: {0}")]
    SerdeYaml(#[from] serde_yaml::Error),

    #[error("invalid settings: {0}")]
    Invalid(String),
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    Catalog(#[from] CatalogError),

    #[error("{0}")]
    Model(#[from] ModelError),

    #[error("persistence error: {0}")]
    Store(#[from] StoreError),

    #[error("viewer session error: {0}")]
    Session(#[from] SessionError),

    #[error("settings error: {0}")]
    Settings(#[from] SettingsError),

    #[error("remote service error: {0}")]
    Client(#[from] ClientError),

    #[error("input I/O failure: {0}")]
    Io(#[from] std::io::Error),

    #[error("request failed with status {status}: {message}")]
    Request { status: u16, message: String },

    #[error("logging setup failed: {0}")]
    Logging(String),
}

impl AppError {
    pub fn status(&self) -> u16 {
        match self {
            AppError::Catalog(error) if error.is_not_found() => 404,
            AppError::Model(ModelError::InvalidPayload(_)) => 400,
            AppError::Store(StoreError::Model(ModelError::InvalidPayload(_))) => 400,
            AppError::Client(ClientError::Status { code, .. }) => *code,
            AppError::Request { status, .. } => *status,
            _ => 500,
        }
    }

    /// Short description safe to hand to a client. Storage and transport
    /// details stay in the logs.
    pub fn public_message(&self) -> String {
        match self {
            AppError::Catalog(error) => error.to_string(),
            AppError::Model(ModelError::InvalidPayload(message))
            | AppError::Store(StoreError::Model(ModelError::InvalidPayload(message))) => {
                message.clone()
            }
            AppError::Model(_) => "invalid viewer configuration".to_string(),
            AppError::Store(_) => "persistence failure".to_string(),
            AppError::Session(_) => "viewer session failure".to_string(),
            AppError::Settings(_) => "server misconfigured".to_string(),
            AppError::Client(error) => error.to_string(),
            AppError::Request { message, .. } => message.clone(),
            AppError::Io(_) | AppError::Logging(_) => "internal error".to_string(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == 404
    }
}
