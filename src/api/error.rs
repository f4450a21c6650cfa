use thiserror::Error;

use crate::model::ModelError;

pub type Result<T> = std::result::Result<T, ClientError>;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("request to {url} failed: {message}")]
    Transport { url: String, message: String },

    #[error("server answered {code}: {message}")]
    Status { code: u16, message: String },

    #[error("unexpected response body: {0}")]
    Decode(String),

    #[error("{0}")]
    Model(#[from] ModelError),
}

impl ClientError {
    /// Whether repeating the same request may succeed.
    pub fn is_retriable(&self) -> bool {
        match self {
            ClientError::Transport { .. } => true,
            ClientError::Status { code, .. } => *code >= 500 || matches!(code, 408 | 429),
            ClientError::Decode(_) | ClientError::Model(_) => false,
        }
    }
}
