use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::catalog::PatientDetails;
use crate::store::{DefaultConfigBuilder, VolumeSeries};

use super::SettingsError;

pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8000";
pub const DEFAULT_TIMEOUT_MS: u64 = 10_000;

pub const BASE_URL_VAR: &str = "MEDIVIEW_BASE_URL";
pub const DATABASE_VAR: &str = "MEDIVIEW_DATABASE";
pub const TIMEOUT_VAR: &str = "MEDIVIEW_TIMEOUT_MS";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientSettings {
    pub base_url: String,
    pub timeout_ms: u64,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_ms: DEFAULT_TIMEOUT_MS,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub base_url: String,
    pub database_path: Option<PathBuf>,
    pub volume: VolumeSeries,
    pub client: ClientSettings,
    pub patient: PatientDetails,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            database_path: None,
            volume: VolumeSeries::default(),
            client: ClientSettings::default(),
            patient: PatientDetails::default(),
        }
    }
}

impl Settings {
    /// Reads settings from `path` (YAML for `.yaml`/`.yml`, JSON otherwise),
    /// or starts from the defaults when no path is given. Environment
    /// overrides are applied before validation.
    pub fn load(path: Option<&Path>) -> Result<Self, SettingsError> {
        let mut settings = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        settings.apply_overrides(|name| std::env::var(name).ok())?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path)?;
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .unwrap_or_default()
            .to_ascii_lowercase();
        let settings = if matches!(extension.as_str(), "yaml" | "yml") {
            serde_yaml::from_str::<Settings>(&raw)?
        } else {
            serde_json::from_str::<Settings>(&raw)?
        };
        Ok(settings)
    }

    /// Applies `MEDIVIEW_*` overrides looked up through `var`. An empty
    /// database override switches back to in-memory storage.
    pub fn apply_overrides<F>(&mut self, var: F) -> Result<(), SettingsError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(base_url) = var(BASE_URL_VAR) {
            self.base_url = base_url;
        }
        if let Some(database) = var(DATABASE_VAR) {
            let database = database.trim();
            self.database_path = (!database.is_empty()).then(|| PathBuf::from(database));
        }
        if let Some(timeout) = var(TIMEOUT_VAR) {
            self.client.timeout_ms = timeout.trim().parse().map_err(|_| {
                SettingsError::Invalid(format!("{TIMEOUT_VAR} must be milliseconds, got {timeout:?}"))
            })?;
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.base_url.trim().is_empty() {
            return Err(SettingsError::Invalid("base_url must not be empty".to_string()));
        }
        if self.volume.slice_count == 0 {
            return Err(SettingsError::Invalid(
                "volume.slice_count must be at least 1".to_string(),
            ));
        }
        if self
            .volume
            .first_index
            .checked_add(self.volume.slice_count)
            .is_none()
        {
            return Err(SettingsError::Invalid(
                "volume.first_index + volume.slice_count overflows".to_string(),
            ));
        }
        if self.client.timeout_ms == 0 {
            return Err(SettingsError::Invalid(
                "client.timeout_ms must be positive".to_string(),
            ));
        }
        let mut seen = HashSet::new();
        for file in &self.patient.files {
            if !seen.insert(file.id.as_str()) {
                return Err(SettingsError::Invalid(format!(
                    "file id {} appears more than once in the patient catalog",
                    file.id
                )));
            }
        }
        Ok(())
    }

    pub fn config_builder(&self) -> DefaultConfigBuilder {
        DefaultConfigBuilder::new(self.base_url.clone(), self.volume)
    }
}
