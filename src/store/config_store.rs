use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info};

use crate::catalog::FileDescriptor;
use crate::model::{FileKind, ViewerConfigRecord, ViewerConfigs};

use super::{ConfigBackend, DefaultConfigBuilder, Result, StoreError};

/// Owner of every persisted viewer record.
#[derive(Clone)]
pub struct ConfigStore {
    backend: Arc<dyn ConfigBackend>,
    builder: DefaultConfigBuilder,
}

impl std::fmt::Debug for ConfigStore {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter
            .debug_struct("ConfigStore")
            .field("backend", &self.backend.describe())
            .field("builder", &self.builder)
            .finish()
    }
}

impl ConfigStore {
    pub fn new(backend: Arc<dyn ConfigBackend>, builder: DefaultConfigBuilder) -> Self {
        Self { backend, builder }
    }

    pub fn backend(&self) -> &dyn ConfigBackend {
        self.backend.as_ref()
    }

    pub fn builder(&self) -> &DefaultConfigBuilder {
        &self.builder
    }

    pub fn find(&self, kind: FileKind, id: &str) -> Result<Option<ViewerConfigRecord>> {
        self.backend.find(kind, id)
    }

    /// Returns the stored record for `id`, creating it from defaults on first
    /// access. Concurrent first accesses resolve to the single record that
    /// won the backend's insert-if-absent.
    pub fn get_or_create(
        &self,
        id: &str,
        descriptor: &FileDescriptor,
    ) -> Result<ViewerConfigRecord> {
        let kind = descriptor.kind;
        let record = match self.backend.find(kind, id)? {
            Some(record) => record,
            None => {
                let fresh = self.builder.build(descriptor, Utc::now());
                if self.backend.insert_if_absent(&fresh)? {
                    info!(file_id = %id, kind = %kind, "created default viewer configuration");
                    return Ok(fresh);
                }
                debug!(file_id = %id, kind = %kind, "lost creation race, reading stored record");
                self.backend
                    .find(kind, id)?
                    .ok_or_else(|| StoreError::Missing {
                        kind,
                        id: id.to_string(),
                    })?
            }
        };

        if record.viewer.image_url.is_some() {
            return Ok(record);
        }
        self.backfill_image_url(id, descriptor)
    }

    // Records first written by a config update carry no image URL yet.
    fn backfill_image_url(
        &self,
        id: &str,
        descriptor: &FileDescriptor,
    ) -> Result<ViewerConfigRecord> {
        let image_url = self.builder.image_url(descriptor);
        info!(file_id = %id, kind = %descriptor.kind, "backfilling image URL on stored configuration");
        self.backend
            .upsert_with(descriptor.kind, id, &mut |current| {
                let mut record = current.unwrap_or_else(|| {
                    ViewerConfigRecord::new(
                        id,
                        None,
                        ViewerConfigs::empty(descriptor.kind),
                        Utc::now(),
                    )
                });
                if record.viewer.image_url.is_none() {
                    record.viewer.image_url = Some(image_url.clone());
                }
                Ok(record)
            })
    }

    /// Writes only the fields present in `partial`. Creates the record with
    /// just those fields when none exists yet.
    pub fn apply_partial_update(&self, id: &str, partial: ViewerConfigs) -> Result<ViewerConfigs> {
        let kind = partial.kind();
        let mut patch = Some(partial);
        let record = self.backend.upsert_with(kind, id, &mut |current| {
            let now = Utc::now();
            let patch = patch.take().unwrap_or_else(|| ViewerConfigs::empty(kind));
            match current {
                Some(mut record) => {
                    record.viewer.configs.merge(patch)?;
                    record.updated_at = now;
                    Ok(record)
                }
                None => Ok(ViewerConfigRecord::new(id, None, patch, now)),
            }
        })?;
        debug!(file_id = %id, kind = %kind, "merged configuration fields");
        Ok(record.viewer.configs)
    }

    pub fn replace_configs(&self, id: &str, configs: ViewerConfigs) -> Result<ViewerConfigs> {
        let kind = configs.kind();
        let mut replacement = Some(configs);
        let record = self.backend.upsert_with(kind, id, &mut |current| {
            let now = Utc::now();
            let configs = replacement
                .take()
                .unwrap_or_else(|| ViewerConfigs::empty(kind));
            match current {
                Some(mut record) => {
                    record.viewer.configs = configs;
                    record.updated_at = now;
                    Ok(record)
                }
                None => Ok(ViewerConfigRecord::new(id, None, configs, now)),
            }
        })?;
        debug!(file_id = %id, kind = %kind, "replaced configuration bag");
        Ok(record.viewer.configs)
    }
}
