use serde::{Deserialize, Serialize};

use crate::model::FileKind;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileDescriptor {
    pub id: String,
    pub name: String,
    #[serde(rename = "type", alias = "kind")]
    pub kind: FileKind,
}

impl FileDescriptor {
    pub fn new(id: impl Into<String>, name: impl Into<String>, kind: FileKind) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            kind,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatientDetails {
    pub patient_id: String,
    pub patient_name: String,
    #[serde(default)]
    pub files: Vec<FileDescriptor>,
}

impl Default for PatientDetails {
    fn default() -> Self {
        Self {
            patient_id: "P001".to_string(),
            patient_name: "John Doe".to_string(),
            files: vec![
                FileDescriptor::new("h1", "2D Stack", FileKind::Stack),
                FileDescriptor::new("d3d", "3D Volume Series", FileKind::Volume),
                FileDescriptor::new("painting", "Reference Image", FileKind::Image),
            ],
        }
    }
}
