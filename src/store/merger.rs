use serde_json::Value;
use tracing::debug;

use crate::model::{FileKind, UpdateStrategy, ViewerConfigs};
use crate::session::ConfigSink;

use super::{ConfigStore, Result, StoreError};

#[derive(Debug, Clone)]
pub struct ConfigMerger {
    store: ConfigStore,
}

impl ConfigMerger {
    pub fn new(store: ConfigStore) -> Self {
        Self { store }
    }

    /// Applies a raw client payload. Absent and `null` fields are never written.
    pub fn update(&self, kind: FileKind, id: &str, payload: Value) -> Result<ViewerConfigs> {
        let configs = ViewerConfigs::from_value(kind, payload)?;
        self.update_configs(id, configs)
    }

    pub fn update_configs(&self, id: &str, configs: ViewerConfigs) -> Result<ViewerConfigs> {
        let kind = configs.kind();
        let strategy = kind.update_strategy();
        debug!(file_id = %id, kind = %kind, ?strategy, "applying configuration update");
        match strategy {
            UpdateStrategy::MergeFields => self.store.apply_partial_update(id, configs),
            UpdateStrategy::ReplaceAll => self.store.replace_configs(id, configs),
        }
    }
}

impl ConfigSink for ConfigMerger {
    type Error = StoreError;

    fn save_configs(&self, file_id: &str, configs: ViewerConfigs) -> Result<ViewerConfigs> {
        self.update_configs(file_id, configs)
    }
}
