use std::collections::HashMap;
use std::sync::Mutex;

use crate::model::{FileKind, ViewerConfigRecord};

use super::{ConfigBackend, RecordUpdate, Result, StoreError};

type Collections = HashMap<FileKind, HashMap<String, ViewerConfigRecord>>;

/// Process-local storage used when no database is configured or reachable.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    collections: Mutex<Collections>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Collections>> {
        self.collections.lock().map_err(|_| StoreError::Poisoned)
    }
}

impl ConfigBackend for MemoryBackend {
    fn describe(&self) -> &'static str {
        "In-Memory"
    }

    fn is_durable(&self) -> bool {
        false
    }

    fn find(&self, kind: FileKind, id: &str) -> Result<Option<ViewerConfigRecord>> {
        let collections = self.lock()?;
        Ok(collections
            .get(&kind)
            .and_then(|collection| collection.get(id))
            .cloned())
    }

    fn insert_if_absent(&self, record: &ViewerConfigRecord) -> Result<bool> {
        let mut collections = self.lock()?;
        let collection = collections.entry(record.kind()).or_default();
        if collection.contains_key(&record.id) {
            return Ok(false);
        }
        collection.insert(record.id.clone(), record.clone());
        Ok(true)
    }

    fn upsert_with(
        &self,
        kind: FileKind,
        id: &str,
        update: RecordUpdate<'_>,
    ) -> Result<ViewerConfigRecord> {
        let mut collections = self.lock()?;
        let collection = collections.entry(kind).or_default();
        let updated = update(collection.get(id).cloned())?;
        collection.insert(id.to_string(), updated.clone());
        Ok(updated)
    }

    fn count(&self, kind: FileKind) -> Result<usize> {
        let collections = self.lock()?;
        Ok(collections.get(&kind).map_or(0, HashMap::len))
    }
}
