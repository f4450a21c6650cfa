use std::collections::HashSet;

use tracing::{debug, warn};

use crate::model::{AnnotationRecord, annotation_uids};

use super::{RenderCollaborator, RenderError};

#[derive(Debug, Default)]
enum LogState {
    #[default]
    Idle,
    Active(Tracking),
}

#[derive(Debug)]
struct Tracking {
    viewport_id: String,
    saved: HashSet<String>,
    // Oldest first; undo pops from the back.
    pending: Vec<String>,
}

impl Tracking {
    fn reset_saved(&mut self, saved: &[AnnotationRecord]) {
        self.saved = annotation_uids(saved).map(str::to_string).collect();
        self.pending.clear();
    }
}

/// Result of one undo step. The UID is consumed even when the render layer
/// failed to remove it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Undone {
    pub annotation_uid: String,
    pub render_error: Option<RenderError>,
}

/// Undo history of annotations drawn on one viewport since the last save.
///
/// Annotations that are already persisted are never undoable; everything else
/// is undone strictly newest first. The log is `Idle` until [`start`] and
/// ignores every event while idle.
///
/// [`start`]: AnnotationUndoLog::start
#[derive(Debug, Default)]
pub struct AnnotationUndoLog {
    state: LogState,
}

impl AnnotationUndoLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn start(&mut self, viewport_id: impl Into<String>, saved: &[AnnotationRecord]) {
        let mut tracking = Tracking {
            viewport_id: viewport_id.into(),
            saved: HashSet::new(),
            pending: Vec::new(),
        };
        tracking.reset_saved(saved);
        debug!(
            viewport_id = %tracking.viewport_id,
            saved = tracking.saved.len(),
            "annotation undo log started"
        );
        self.state = LogState::Active(tracking);
    }

    pub fn end(&mut self) {
        if let LogState::Active(tracking) = std::mem::take(&mut self.state) {
            debug!(
                viewport_id = %tracking.viewport_id,
                discarded = tracking.pending.len(),
                "annotation undo log ended"
            );
        }
    }

    pub fn is_active(&self) -> bool {
        matches!(self.state, LogState::Active(_))
    }

    pub fn viewport_id(&self) -> Option<&str> {
        match &self.state {
            LogState::Active(tracking) => Some(&tracking.viewport_id),
            LogState::Idle => None,
        }
    }

    /// Records a newly drawn annotation. Returns whether it became undoable;
    /// a UID that is already pending is ignored.
    pub fn on_annotation_added(&mut self, annotation_uid: &str, event_viewport_id: &str) -> bool {
        let LogState::Active(tracking) = &mut self.state else {
            return false;
        };
        if tracking.viewport_id != event_viewport_id {
            return false;
        }
        if tracking.saved.contains(annotation_uid) {
            return false;
        }
        if tracking.pending.iter().any(|uid| uid == annotation_uid) {
            return false;
        }
        tracking.pending.push(annotation_uid.to_string());
        true
    }

    pub fn undo<R>(&mut self, renderer: &mut R) -> Option<Undone>
    where
        R: RenderCollaborator + ?Sized,
    {
        let LogState::Active(tracking) = &mut self.state else {
            return None;
        };
        let annotation_uid = tracking.pending.pop()?;

        let removed = renderer.remove_annotation(&annotation_uid);
        let redrawn = renderer.request_redraw(&tracking.viewport_id);
        let render_error = removed.err().or(redrawn.err());
        if let Some(error) = &render_error {
            warn!(
                viewport_id = %tracking.viewport_id,
                annotation_uid = %annotation_uid,
                %error,
                "render layer failed while undoing annotation"
            );
        } else {
            debug!(viewport_id = %tracking.viewport_id, annotation_uid = %annotation_uid, "annotation undone");
        }

        Some(Undone {
            annotation_uid,
            render_error,
        })
    }

    pub fn reconcile(&mut self, saved: &[AnnotationRecord]) {
        if let LogState::Active(tracking) = &mut self.state {
            tracking.reset_saved(saved);
        }
    }

    pub fn can_undo(&self) -> bool {
        !self.pending().is_empty()
    }

    pub fn pending(&self) -> &[String] {
        match &self.state {
            LogState::Active(tracking) => &tracking.pending,
            LogState::Idle => &[],
        }
    }

    pub fn is_saved(&self, annotation_uid: &str) -> bool {
        match &self.state {
            LogState::Active(tracking) => tracking.saved.contains(annotation_uid),
            LogState::Idle => false,
        }
    }
}
