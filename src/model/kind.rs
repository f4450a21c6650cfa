use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::ModelError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", try_from = "String")]
pub enum FileKind {
    Stack,
    Volume,
    Image,
}

/// How a config update is applied to the stored bag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateStrategy {
    /// Only the fields present in the payload are written.
    MergeFields,
    /// The payload becomes the whole bag.
    ReplaceAll,
}

impl FileKind {
    pub const ALL: [FileKind; 3] = [FileKind::Stack, FileKind::Volume, FileKind::Image];

    pub fn as_str(self) -> &'static str {
        match self {
            FileKind::Stack => "stack",
            FileKind::Volume => "volume",
            FileKind::Image => "image",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            FileKind::Stack => "Stack",
            FileKind::Volume => "Volume",
            FileKind::Image => "Image",
        }
    }

    // Image updates replace the whole bag while the DICOM kinds merge per field.
    pub fn update_strategy(self) -> UpdateStrategy {
        match self {
            FileKind::Stack | FileKind::Volume => UpdateStrategy::MergeFields,
            FileKind::Image => UpdateStrategy::ReplaceAll,
        }
    }
}

impl fmt::Display for FileKind {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

impl FromStr for FileKind {
    type Err = ModelError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "stack" => Ok(FileKind::Stack),
            "volume" => Ok(FileKind::Volume),
            "image" => Ok(FileKind::Image),
            _ => Err(ModelError::UnsupportedKind(value.to_string())),
        }
    }
}

impl TryFrom<String> for FileKind {
    type Error = ModelError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}
