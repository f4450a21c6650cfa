use std::sync::mpsc::Receiver;

use tracing::{debug, error, info, warn};

use crate::model::{FileKind, ViewerConfigRecord, ViewerConfigs};

use super::{
    AnnotationAdded, AnnotationUndoLog, OpacityPoint, RenderCollaborator, Result, SessionError,
    Undone, VoiRange, WindowLevelBaseline, annotation_channel, shift_opacity,
};

/// Destination of a viewer save: the local merger or a remote server.
pub trait ConfigSink {
    type Error: std::error::Error + Send + Sync + 'static;

    fn save_configs(
        &self,
        file_id: &str,
        configs: ViewerConfigs,
    ) -> std::result::Result<ViewerConfigs, Self::Error>;
}

/// One mounted viewport showing one file.
pub struct ViewerSession<R: RenderCollaborator> {
    file_id: String,
    viewport_id: String,
    adjustments: ViewerConfigs,
    renderer: R,
    events: Receiver<AnnotationAdded>,
    undo_log: AnnotationUndoLog,
    window_baseline: Option<WindowLevelBaseline>,
    opacity_baseline: Option<Vec<OpacityPoint>>,
}

impl<R: RenderCollaborator> std::fmt::Debug for ViewerSession<R> {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter
            .debug_struct("ViewerSession")
            .field("file_id", &self.file_id)
            .field("viewport_id", &self.viewport_id)
            .field("adjustments", &self.adjustments)
            .field("undo_log", &self.undo_log)
            .finish()
    }
}

impl<R: RenderCollaborator> ViewerSession<R> {
    /// Mounts `record` on `viewport_id`: restores its saved annotations on the
    /// canvas and starts undo tracking against them.
    pub fn open(
        record: &ViewerConfigRecord,
        viewport_id: impl Into<String>,
        mut renderer: R,
    ) -> Self {
        let viewport_id = viewport_id.into();
        let (sender, events) = annotation_channel();
        renderer.subscribe(sender);

        let mut adjustments = record.configs().clone();
        let saved = adjustments.take_annotations().unwrap_or_default();
        if let Err(error) = renderer.restore_annotations(&saved, &viewport_id) {
            warn!(
                file_id = %record.id,
                viewport_id = %viewport_id,
                %error,
                "could not restore saved annotations"
            );
        }

        let mut undo_log = AnnotationUndoLog::new();
        undo_log.start(viewport_id.clone(), &saved);
        info!(
            file_id = %record.id,
            viewport_id = %viewport_id,
            kind = %record.kind(),
            saved_annotations = saved.len(),
            "viewer session opened"
        );

        Self {
            file_id: record.id.clone(),
            viewport_id,
            adjustments,
            renderer,
            events,
            undo_log,
            window_baseline: None,
            opacity_baseline: None,
        }
    }

    pub fn file_id(&self) -> &str {
        &self.file_id
    }

    pub fn viewport_id(&self) -> &str {
        &self.viewport_id
    }

    pub fn kind(&self) -> FileKind {
        self.adjustments.kind()
    }

    pub fn adjustments(&self) -> &ViewerConfigs {
        &self.adjustments
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn renderer_mut(&mut self) -> &mut R {
        &mut self.renderer
    }

    pub fn undo_log(&self) -> &AnnotationUndoLog {
        &self.undo_log
    }

    pub fn pump_events(&mut self) -> usize {
        let mut accepted = 0;
        while let Ok(event) = self.events.try_recv() {
            if self.handle_event(&event) {
                accepted += 1;
            }
        }
        accepted
    }

    pub fn handle_event(&mut self, event: &AnnotationAdded) -> bool {
        let accepted = self
            .undo_log
            .on_annotation_added(&event.annotation_uid, &event.viewport_id);
        if accepted {
            debug!(
                viewport_id = %self.viewport_id,
                annotation_uid = %event.annotation_uid,
                "annotation added to undo history"
            );
        }
        accepted
    }

    pub fn can_undo(&mut self) -> bool {
        self.pump_events();
        self.undo_log.can_undo()
    }

    pub fn undo(&mut self) -> Option<Undone> {
        self.pump_events();
        self.undo_log.undo(&mut self.renderer)
    }

    pub fn set_contrast(&mut self, contrast: f64) -> Result<()> {
        match &mut self.adjustments {
            ViewerConfigs::Stack(bag) => bag.contrast = Some(contrast),
            ViewerConfigs::Image(bag) => bag.contrast = Some(contrast),
            ViewerConfigs::Volume(_) => return Err(self.unsupported("contrast")),
        }
        Ok(())
    }

    pub fn set_brightness(&mut self, brightness: f64) -> Result<()> {
        match &mut self.adjustments {
            ViewerConfigs::Stack(bag) => bag.brightness = Some(brightness),
            ViewerConfigs::Image(bag) => bag.brightness = Some(brightness),
            ViewerConfigs::Volume(_) => return Err(self.unsupported("brightness")),
        }
        Ok(())
    }

    pub fn set_inverted(&mut self, inverted: bool) -> Result<()> {
        match &mut self.adjustments {
            ViewerConfigs::Stack(bag) => bag.is_inverted = Some(inverted),
            ViewerConfigs::Image(bag) => bag.is_inverted = Some(inverted),
            ViewerConfigs::Volume(_) => return Err(self.unsupported("isInverted")),
        }
        Ok(())
    }

    pub fn set_grayscale(&mut self, grayscale: bool) -> Result<()> {
        match &mut self.adjustments {
            ViewerConfigs::Stack(bag) => bag.is_grayscale = Some(grayscale),
            ViewerConfigs::Image(bag) => bag.is_grayscale = Some(grayscale),
            ViewerConfigs::Volume(_) => return Err(self.unsupported("isGrayscale")),
        }
        Ok(())
    }

    pub fn set_sharpness(&mut self, sharpness: f64) -> Result<()> {
        match &mut self.adjustments {
            ViewerConfigs::Image(bag) => bag.sharpness = Some(sharpness),
            _ => return Err(self.unsupported("sharpness")),
        }
        Ok(())
    }

    pub fn set_gamma(&mut self, [r, g, b]: [f64; 3]) -> Result<()> {
        match &mut self.adjustments {
            ViewerConfigs::Image(bag) => {
                bag.gamma_r = Some(r);
                bag.gamma_g = Some(g);
                bag.gamma_b = Some(b);
            }
            _ => return Err(self.unsupported("gamma")),
        }
        Ok(())
    }

    pub fn set_shift(&mut self, shift: f64) -> Result<()> {
        match &mut self.adjustments {
            ViewerConfigs::Volume(bag) => bag.shift = Some(shift),
            _ => return Err(self.unsupported("shift")),
        }
        Ok(())
    }

    /// Window to display for the current contrast and brightness. The first
    /// `observed` range becomes this session's baseline; later ones are ignored.
    pub fn window_level(&mut self, observed: VoiRange) -> Result<VoiRange> {
        let (contrast, brightness) = match &self.adjustments {
            ViewerConfigs::Stack(bag) => (bag.contrast(), bag.brightness()),
            ViewerConfigs::Image(bag) => (bag.contrast(), bag.brightness()),
            ViewerConfigs::Volume(_) => return Err(self.unsupported("window level")),
        };
        let baseline = *self
            .window_baseline
            .get_or_insert_with(|| WindowLevelBaseline::capture(observed));
        Ok(baseline.apply(contrast, brightness))
    }

    /// Opacity transfer function moved by the current shift. The first
    /// `observed` point set becomes this session's baseline.
    pub fn shifted_opacity(&mut self, observed: &[OpacityPoint]) -> Result<Vec<OpacityPoint>> {
        let shift = match &self.adjustments {
            ViewerConfigs::Volume(bag) => bag.shift(),
            _ => return Err(self.unsupported("shift")),
        };
        let baseline = self
            .opacity_baseline
            .get_or_insert_with(|| observed.to_vec());
        Ok(shift_opacity(baseline, shift))
    }

    /// Sends the current adjustments plus the live annotation snapshot to
    /// `sink`. The undo history is reset only once the sink has accepted the
    /// write; on any failure it stays as it was so the save can be retried.
    pub fn save<S: ConfigSink>(&mut self, sink: &S) -> Result<ViewerConfigs> {
        self.pump_events();
        let annotations = self
            .renderer
            .live_annotations(&self.viewport_id)
            .inspect_err(|error| {
                warn!(
                    file_id = %self.file_id,
                    viewport_id = %self.viewport_id,
                    %error,
                    "could not read live annotations, save aborted"
                );
            })?;

        let mut payload = self.adjustments.clone();
        payload.set_annotations(annotations.clone());

        let stored = sink.save_configs(&self.file_id, payload).map_err(|source| {
            error!(file_id = %self.file_id, error = %source, "saving viewer configuration failed");
            SessionError::Save(Box::new(source))
        })?;

        self.undo_log.reconcile(&annotations);
        info!(
            file_id = %self.file_id,
            viewport_id = %self.viewport_id,
            annotations = annotations.len(),
            "viewer configuration saved"
        );
        Ok(stored)
    }

    pub fn close(mut self) -> R {
        self.undo_log.end();
        info!(file_id = %self.file_id, viewport_id = %self.viewport_id, "viewer session closed");
        self.renderer
    }

    fn unsupported(&self, field: &'static str) -> SessionError {
        SessionError::UnsupportedAdjustment {
            kind: self.adjustments.kind(),
            field,
        }
    }
}
