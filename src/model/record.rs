use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{FileKind, Result, ViewerConfigs};

/// Where a viewer loads its pixels from: one URL for stacks and images,
/// an ordered slice series for volumes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ImageUrl {
    Single(String),
    Series(Vec<String>),
}

impl ImageUrl {
    pub fn urls(&self) -> &[String] {
        match self {
            ImageUrl::Single(url) => std::slice::from_ref(url),
            ImageUrl::Series(urls) => urls,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewerState {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<ImageUrl>,
    pub configs: ViewerConfigs,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewerConfigRecord {
    pub id: String,
    pub viewer: ViewerState,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawViewerState {
    #[serde(default)]
    image_url: Option<ImageUrl>,
    #[serde(default)]
    configs: Value,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawRecord {
    id: String,
    viewer: RawViewerState,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl ViewerConfigRecord {
    pub fn new(
        id: impl Into<String>,
        image_url: Option<ImageUrl>,
        configs: ViewerConfigs,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: id.into(),
            viewer: ViewerState { image_url, configs },
            created_at: now,
            updated_at: now,
        }
    }

    pub fn kind(&self) -> FileKind {
        self.viewer.configs.kind()
    }

    pub fn configs(&self) -> &ViewerConfigs {
        &self.viewer.configs
    }

    pub fn with_defaults(&self) -> Self {
        Self {
            viewer: ViewerState {
                image_url: self.viewer.image_url.clone(),
                configs: self.viewer.configs.with_defaults(),
            },
            ..self.clone()
        }
    }

    /// Decodes a record from its wire form. The kind is not part of the
    /// document, so the caller supplies it.
    pub fn from_value(kind: FileKind, value: Value) -> Result<Self> {
        let raw: RawRecord = serde_json::from_value(value)?;
        Ok(Self {
            id: raw.id,
            viewer: ViewerState {
                image_url: raw.viewer.image_url,
                configs: ViewerConfigs::from_value(kind, raw.viewer.configs)?,
            },
            created_at: raw.created_at,
            updated_at: raw.updated_at,
        })
    }
}
