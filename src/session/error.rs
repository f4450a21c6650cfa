use thiserror::Error;

use crate::model::FileKind;

pub type Result<T> = std::result::Result<T, SessionError>;

/// Failure reported by the rendering layer. These are soft: the session logs
/// them and keeps going.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RenderError {
    #[error("annotation {0} is not present in the live render state")]
    UnknownAnnotation(String),

    #[error("viewport {0} is not available")]
    ViewportUnavailable(String),

    #[error("render layer failure: {0}")]
    Other(String),
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("render collaborator error: {0}")]
    Render(#[from] RenderError),

    #[error("saving viewer configuration failed: {0}")]
    Save(#[source] Box<dyn std::error::Error + Send + Sync + 'static>),

    #[error("{field} cannot be adjusted on a {kind} viewer")]
    UnsupportedAdjustment { kind: FileKind, field: &'static str },
}
