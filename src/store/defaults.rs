use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::catalog::FileDescriptor;
use crate::model::{FileKind, ImageUrl, ViewerConfigRecord, ViewerConfigs};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VolumeSeries {
    pub slice_count: usize,
    pub first_index: usize,
}

impl Default for VolumeSeries {
    fn default() -> Self {
        Self {
            slice_count: 291,
            first_index: 1,
        }
    }
}

/// Builds the record a file gets the first time it is viewed.
///
/// The URL-bearing fields depend only on the descriptor and the builder's
/// settings, so repeated builds for the same file agree byte for byte.
#[derive(Debug, Clone, PartialEq)]
pub struct DefaultConfigBuilder {
    base_url: String,
    volume: VolumeSeries,
}

impl DefaultConfigBuilder {
    pub fn new(base_url: impl Into<String>, volume: VolumeSeries) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { base_url, volume }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn image_url(&self, descriptor: &FileDescriptor) -> ImageUrl {
        let base = &self.base_url;
        let id = &descriptor.id;
        match descriptor.kind {
            FileKind::Stack => {
                ImageUrl::Single(format!("wadouri:{base}/files/{}.dcm", id.to_uppercase()))
            }
            FileKind::Volume => {
                let first = self.volume.first_index;
                let urls = (0..self.volume.slice_count)
                    .map_while(|offset| first.checked_add(offset))
                    .map(|index| format!("wadouri:{base}/files/{id}/3DSlice{index}.dcm"))
                    .collect();
                ImageUrl::Series(urls)
            }
            FileKind::Image => ImageUrl::Single(format!("{base}/files/{id}.jpg")),
        }
    }

    pub fn build(&self, descriptor: &FileDescriptor, now: DateTime<Utc>) -> ViewerConfigRecord {
        ViewerConfigRecord::new(
            descriptor.id.clone(),
            Some(self.image_url(descriptor)),
            ViewerConfigs::empty(descriptor.kind),
            now,
        )
    }
}

impl Default for DefaultConfigBuilder {
    fn default() -> Self {
        Self::new("http://127.0.0.1:8000", VolumeSeries::default())
    }
}
