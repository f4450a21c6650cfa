use serde::{Deserialize, Serialize};
use serde::de::DeserializeOwned;
use serde_json::Value;

use super::{AnnotationRecord, FileKind, ModelError, Result};

pub const DEFAULT_CONTRAST: f64 = 1.0;
pub const DEFAULT_BRIGHTNESS: f64 = 1.0;
pub const DEFAULT_SHIFT: f64 = 400.0;
pub const DEFAULT_SHARPNESS: f64 = 100.0;
pub const DEFAULT_GAMMA: f64 = 1.0;

macro_rules! overlay_fields {
    ($target:expr, $patch:expr, $($field:ident),+ $(,)?) => {
        $(
            if let Some(value) = $patch.$field {
                $target.$field = Some(value);
            }
        )+
    };
}

macro_rules! all_unset {
    ($bag:expr, $($field:ident),+ $(,)?) => {
        true $(&& $bag.$field.is_none())+
    };
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StackConfigs {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contrast: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub brightness: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_inverted: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_grayscale: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub annotations: Option<Vec<AnnotationRecord>>,
}

impl StackConfigs {
    pub fn contrast(&self) -> f64 {
        self.contrast.unwrap_or(DEFAULT_CONTRAST)
    }

    pub fn brightness(&self) -> f64 {
        self.brightness.unwrap_or(DEFAULT_BRIGHTNESS)
    }

    pub fn is_inverted(&self) -> bool {
        self.is_inverted.unwrap_or(false)
    }

    pub fn is_grayscale(&self) -> bool {
        self.is_grayscale.unwrap_or(false)
    }

    fn overlay(&mut self, patch: StackConfigs) {
        overlay_fields!(self, patch, contrast, brightness, is_inverted, is_grayscale, annotations);
    }

    fn materialize_defaults(&mut self) {
        self.contrast.get_or_insert(DEFAULT_CONTRAST);
        self.brightness.get_or_insert(DEFAULT_BRIGHTNESS);
        self.annotations.get_or_insert_with(Vec::new);
    }

    fn is_empty(&self) -> bool {
        all_unset!(self, contrast, brightness, is_inverted, is_grayscale, annotations)
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VolumeConfigs {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shift: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub annotations: Option<Vec<AnnotationRecord>>,
}

impl VolumeConfigs {
    pub fn shift(&self) -> f64 {
        self.shift.unwrap_or(DEFAULT_SHIFT)
    }

    fn overlay(&mut self, patch: VolumeConfigs) {
        overlay_fields!(self, patch, shift, annotations);
    }

    fn materialize_defaults(&mut self) {
        self.shift.get_or_insert(DEFAULT_SHIFT);
        self.annotations.get_or_insert_with(Vec::new);
    }

    fn is_empty(&self) -> bool {
        all_unset!(self, shift, annotations)
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageConfigs {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contrast: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub brightness: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_inverted: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_grayscale: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sharpness: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gamma_r: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gamma_g: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gamma_b: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub annotations: Option<Vec<AnnotationRecord>>,
}

impl ImageConfigs {
    pub fn contrast(&self) -> f64 {
        self.contrast.unwrap_or(DEFAULT_CONTRAST)
    }

    pub fn brightness(&self) -> f64 {
        self.brightness.unwrap_or(DEFAULT_BRIGHTNESS)
    }

    pub fn is_inverted(&self) -> bool {
        self.is_inverted.unwrap_or(false)
    }

    pub fn is_grayscale(&self) -> bool {
        self.is_grayscale.unwrap_or(false)
    }

    pub fn sharpness(&self) -> f64 {
        self.sharpness.unwrap_or(DEFAULT_SHARPNESS)
    }

    pub fn gamma(&self) -> [f64; 3] {
        [
            self.gamma_r.unwrap_or(DEFAULT_GAMMA),
            self.gamma_g.unwrap_or(DEFAULT_GAMMA),
            self.gamma_b.unwrap_or(DEFAULT_GAMMA),
        ]
    }

    fn overlay(&mut self, patch: ImageConfigs) {
        overlay_fields!(
            self,
            patch,
            contrast,
            brightness,
            is_inverted,
            is_grayscale,
            sharpness,
            gamma_r,
            gamma_g,
            gamma_b,
            annotations,
        );
    }

    fn materialize_defaults(&mut self) {
        self.contrast.get_or_insert(DEFAULT_CONTRAST);
        self.brightness.get_or_insert(DEFAULT_BRIGHTNESS);
        self.annotations.get_or_insert_with(Vec::new);
    }

    fn is_empty(&self) -> bool {
        all_unset!(
            self,
            contrast,
            brightness,
            is_inverted,
            is_grayscale,
            sharpness,
            gamma_r,
            gamma_g,
            gamma_b,
            annotations,
        )
    }
}

/// Adjustment bag of one viewer record. Every field is optional: an absent
/// field means "never written" and reads back as the schema default.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ViewerConfigs {
    Stack(StackConfigs),
    Volume(VolumeConfigs),
    Image(ImageConfigs),
}

impl ViewerConfigs {
    pub fn empty(kind: FileKind) -> Self {
        match kind {
            FileKind::Stack => ViewerConfigs::Stack(StackConfigs::default()),
            FileKind::Volume => ViewerConfigs::Volume(VolumeConfigs::default()),
            FileKind::Image => ViewerConfigs::Image(ImageConfigs::default()),
        }
    }

    pub fn kind(&self) -> FileKind {
        match self {
            ViewerConfigs::Stack(_) => FileKind::Stack,
            ViewerConfigs::Volume(_) => FileKind::Volume,
            ViewerConfigs::Image(_) => FileKind::Image,
        }
    }

    /// Parses a client payload for `kind`. `null` fields count as absent and
    /// unknown keys are ignored.
    pub fn from_value(kind: FileKind, value: Value) -> Result<Self> {
        let value = match value {
            Value::Null => return Ok(Self::empty(kind)),
            Value::Object(map) => Value::Object(map),
            other => {
                return Err(ModelError::InvalidPayload(format!(
                    "{kind} configuration must be a JSON object, got {}",
                    json_type_name(&other)
                )));
            }
        };
        let configs = match kind {
            FileKind::Stack => ViewerConfigs::Stack(parse_bag(kind, value)?),
            FileKind::Volume => ViewerConfigs::Volume(parse_bag(kind, value)?),
            FileKind::Image => ViewerConfigs::Image(parse_bag(kind, value)?),
        };
        Ok(configs)
    }

    pub fn to_value(&self) -> Result<Value> {
        Ok(serde_json::to_value(self)?)
    }

    pub fn annotations(&self) -> &[AnnotationRecord] {
        let annotations = match self {
            ViewerConfigs::Stack(bag) => bag.annotations.as_deref(),
            ViewerConfigs::Volume(bag) => bag.annotations.as_deref(),
            ViewerConfigs::Image(bag) => bag.annotations.as_deref(),
        };
        annotations.unwrap_or_default()
    }

    pub fn set_annotations(&mut self, annotations: Vec<AnnotationRecord>) {
        match self {
            ViewerConfigs::Stack(bag) => bag.annotations = Some(annotations),
            ViewerConfigs::Volume(bag) => bag.annotations = Some(annotations),
            ViewerConfigs::Image(bag) => bag.annotations = Some(annotations),
        }
    }

    pub fn take_annotations(&mut self) -> Option<Vec<AnnotationRecord>> {
        match self {
            ViewerConfigs::Stack(bag) => bag.annotations.take(),
            ViewerConfigs::Volume(bag) => bag.annotations.take(),
            ViewerConfigs::Image(bag) => bag.annotations.take(),
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            ViewerConfigs::Stack(bag) => bag.is_empty(),
            ViewerConfigs::Volume(bag) => bag.is_empty(),
            ViewerConfigs::Image(bag) => bag.is_empty(),
        }
    }

    pub fn merge(&mut self, patch: ViewerConfigs) -> Result<()> {
        match (self, patch) {
            (ViewerConfigs::Stack(bag), ViewerConfigs::Stack(patch)) => bag.overlay(patch),
            (ViewerConfigs::Volume(bag), ViewerConfigs::Volume(patch)) => bag.overlay(patch),
            (ViewerConfigs::Image(bag), ViewerConfigs::Image(patch)) => bag.overlay(patch),
            (current, patch) => {
                return Err(ModelError::KindMismatch {
                    expected: current.kind(),
                    found: patch.kind(),
                });
            }
        }
        Ok(())
    }

    /// Copy with the schema defaults filled in, as handed to viewers on read.
    pub fn with_defaults(&self) -> Self {
        let mut resolved = self.clone();
        match &mut resolved {
            ViewerConfigs::Stack(bag) => bag.materialize_defaults(),
            ViewerConfigs::Volume(bag) => bag.materialize_defaults(),
            ViewerConfigs::Image(bag) => bag.materialize_defaults(),
        }
        resolved
    }
}

fn parse_bag<T: DeserializeOwned>(kind: FileKind, value: Value) -> Result<T> {
    serde_json::from_value(value)
        .map_err(|error| ModelError::InvalidPayload(format!("{kind} configuration: {error}")))
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
