use std::sync::mpsc::{self, Receiver, Sender};

use crate::model::AnnotationRecord;

use super::RenderError;

/// Emitted by the rendering layer whenever an annotation lands on a viewport,
/// including annotations it re-adds while restoring saved state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnnotationAdded {
    pub annotation_uid: String,
    pub viewport_id: String,
}

impl AnnotationAdded {
    pub fn new(annotation_uid: impl Into<String>, viewport_id: impl Into<String>) -> Self {
        Self {
            annotation_uid: annotation_uid.into(),
            viewport_id: viewport_id.into(),
        }
    }
}

pub fn annotation_channel() -> (Sender<AnnotationAdded>, Receiver<AnnotationAdded>) {
    mpsc::channel()
}

/// What a viewer session needs from the canvas that actually draws things.
pub trait RenderCollaborator {
    fn live_annotations(&self, viewport_id: &str) -> Result<Vec<AnnotationRecord>, RenderError>;

    /// Seeds a freshly created viewport with previously saved annotations.
    fn restore_annotations(
        &mut self,
        records: &[AnnotationRecord],
        viewport_id: &str,
    ) -> Result<(), RenderError>;

    fn remove_annotation(&mut self, annotation_uid: &str) -> Result<(), RenderError>;

    fn request_redraw(&mut self, viewport_id: &str) -> Result<(), RenderError>;

    /// Registers the sender every subsequent [`AnnotationAdded`] is pushed to.
    fn subscribe(&mut self, events: Sender<AnnotationAdded>);
}
