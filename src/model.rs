mod annotation;
mod configs;
mod error;
mod kind;
mod record;


pub use annotation::{AnnotationMetadata, AnnotationRecord, annotation_uids};
pub use configs::{
    DEFAULT_BRIGHTNESS, DEFAULT_CONTRAST, DEFAULT_GAMMA, DEFAULT_SHARPNESS, DEFAULT_SHIFT,
    ImageConfigs, StackConfigs, ViewerConfigs, VolumeConfigs,
};
pub use error::{ModelError, Result};
pub use kind::{FileKind, UpdateStrategy};
pub use record::{ImageUrl, ViewerConfigRecord, ViewerState};
