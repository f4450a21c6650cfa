use std::sync::Arc;

use serde_json::Value;
use tracing::debug;

use crate::catalog::{FileCatalog, PatientDetails};
use crate::model::{FileKind, ViewerConfigRecord, ViewerConfigs};
use crate::store::{ConfigMerger, ConfigStore};

use super::Result;

#[derive(Debug, Clone)]
pub struct ViewerService {
    catalog: Arc<FileCatalog>,
    store: ConfigStore,
    merger: ConfigMerger,
}

impl ViewerService {
    pub fn new(catalog: FileCatalog, store: ConfigStore) -> Self {
        let merger = ConfigMerger::new(store.clone());
        Self {
            catalog: Arc::new(catalog),
            store,
            merger,
        }
    }

    pub fn catalog(&self) -> &FileCatalog {
        &self.catalog
    }

    pub fn store(&self) -> &ConfigStore {
        &self.store
    }

    pub fn merger(&self) -> &ConfigMerger {
        &self.merger
    }

    pub fn patient_files(&self, patient_id: &str) -> Result<PatientDetails> {
        Ok(self.catalog.patient(patient_id)?.clone())
    }

    /// Record for `id` as a viewer of `kind` should see it, defaults filled in.
    /// The record is created on first access.
    pub fn viewer_data(&self, kind: FileKind, id: &str) -> Result<ViewerConfigRecord> {
        let descriptor = self.catalog.resolve_as(id, kind)?;
        let record = self.store.get_or_create(id, descriptor)?;
        debug!(file_id = %id, kind = %kind, "viewer data resolved");
        Ok(record.with_defaults())
    }

    /// Applies a client payload for `id`. Updates do not consult the catalog:
    /// any id gets a record on first write.
    pub fn update_config(&self, kind: FileKind, id: &str, payload: Value) -> Result<ViewerConfigs> {
        Ok(self.merger.update(kind, id, payload)?)
    }
}
