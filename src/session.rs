mod collaborator;
mod error;
mod undo;
mod viewer;
mod window_level;


pub use collaborator::{AnnotationAdded, RenderCollaborator, annotation_channel};
pub use error::{RenderError, Result, SessionError};
pub use undo::{AnnotationUndoLog, Undone};
pub use viewer::{ConfigSink, ViewerSession};
pub use window_level::{OpacityPoint, VoiRange, WindowLevelBaseline, shift_opacity};
