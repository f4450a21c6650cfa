use std::sync::Arc;

use tracing::{info, warn};

use crate::catalog::FileCatalog;
use crate::store::{ConfigBackend, ConfigStore, MemoryBackend, SqliteBackend};

use super::{Result, Settings, ViewerService};

#[derive(Debug, Clone)]
pub struct AppContext {
    settings: Settings,
    viewer_service: ViewerService,
}

impl AppContext {
    pub fn new(settings: Settings) -> Result<Self> {
        let backend = open_backend(&settings);
        Self::with_backend(settings, backend)
    }

    pub fn with_backend(settings: Settings, backend: Arc<dyn ConfigBackend>) -> Result<Self> {
        let catalog = FileCatalog::new(settings.patient.clone())?;
        let store = ConfigStore::new(backend, settings.config_builder());
        Ok(Self {
            viewer_service: ViewerService::new(catalog, store),
            settings,
        })
    }

    pub fn in_memory(settings: Settings) -> Result<Self> {
        Self::with_backend(settings, Arc::new(MemoryBackend::new()))
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn viewer_service(&self) -> &ViewerService {
        &self.viewer_service
    }

    pub fn backend(&self) -> &dyn ConfigBackend {
        self.viewer_service.store().backend()
    }
}

/// Opens the configured SQLite database, falling back to in-memory storage
/// when there is none or it cannot be opened.
pub fn open_backend(settings: &Settings) -> Arc<dyn ConfigBackend> {
    let Some(path) = &settings.database_path else {
        info!("no database configured, using in-memory storage");
        return Arc::new(MemoryBackend::new());
    };
    match SqliteBackend::open(path) {
        Ok(backend) => Arc::new(backend),
        Err(error) => {
            warn!(path = %path.display(), %error, "database unavailable, falling back to in-memory storage");
            Arc::new(MemoryBackend::new())
        }
    }
}
