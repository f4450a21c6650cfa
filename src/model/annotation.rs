use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnnotationMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub viewport_id: Option<String>,
    #[serde(
        rename = "frameOfReferenceUID",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub frame_of_reference_uid: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub referenced_image_id: Option<String>,
}

/// A user-drawn measurement as persisted alongside a viewer configuration.
///
/// `data` is the tool's geometric payload and is stored verbatim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnnotationRecord {
    #[serde(rename = "annotationUID")]
    pub annotation_uid: String,
    pub tool_name: String,
    #[serde(default)]
    pub data: Value,
    #[serde(default)]
    pub metadata: AnnotationMetadata,
}

impl AnnotationRecord {
    pub fn new(annotation_uid: impl Into<String>, tool_name: impl Into<String>) -> Self {
        Self {
            annotation_uid: annotation_uid.into(),
            tool_name: tool_name.into(),
            data: Value::Null,
            metadata: AnnotationMetadata::default(),
        }
    }

    pub fn with_viewport(mut self, viewport_id: impl Into<String>) -> Self {
        self.metadata.viewport_id = Some(viewport_id.into());
        self
    }

    pub fn with_data(mut self, data: Value) -> Self {
        self.data = data;
        self
    }
}

pub fn annotation_uids(records: &[AnnotationRecord]) -> impl Iterator<Item = &str> {
    records.iter().map(|record| record.annotation_uid.as_str())
}
