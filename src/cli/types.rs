use std::fs;
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use serde_json::Value;

use crate::model::{FileKind, ModelError};
use crate::runtime::Result;

#[derive(Debug, Parser)]
#[command(
    name = "mediview",
    version,
    about = "Viewer configuration store and API tools for the medical image viewer"
)]
pub struct Cli {
    /// Settings file (JSON, or YAML for .yaml/.yml).
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// SQLite database; overrides the settings file.
    #[arg(long, global = true)]
    pub database: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Lists the files of a patient.
    Patient { patient_id: String },
    /// Prints the viewer record of a file, creating it on first access.
    Show { kind: FileKind, id: String },
    /// Applies a configuration update to the local store.
    Patch {
        kind: FileKind,
        id: String,
        #[command(flatten)]
        payload: PayloadArgs,
    },
    /// Sends a configuration update to a remote server.
    Push {
        kind: FileKind,
        id: String,
        #[command(flatten)]
        payload: PayloadArgs,
        /// Server base URL; defaults to client.base_url from the settings.
        #[arg(long)]
        server: Option<String>,
    },
    Health,
}

#[derive(Debug, Clone, Args)]
#[group(required = true, multiple = false)]
pub struct PayloadArgs {
    /// Inline JSON payload.
    #[arg(long)]
    pub json: Option<String>,

    /// File holding the payload.
    #[arg(long)]
    pub file: Option<PathBuf>,
}

impl PayloadArgs {
    pub fn load(&self) -> Result<Value> {
        if let Some(raw) = &self.json {
            return Ok(parse_json(raw)?);
        }
        let Some(path) = &self.file else {
            return Ok(Value::Null);
        };
        let raw = fs::read_to_string(path)?;
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .unwrap_or_default()
            .to_ascii_lowercase();
        let payload = if matches!(extension.as_str(), "yaml" | "yml") {
            serde_yaml::from_str::<Value>(&raw)
                .map_err(|error| ModelError::InvalidPayload(format!("{}: {error}", path.display())))?
        } else {
            parse_json(&raw)?
        };
        Ok(payload)
    }
}

fn parse_json(raw: &str) -> std::result::Result<Value, ModelError> {
    serde_json::from_str(raw)
        .map_err(|error| ModelError::InvalidPayload(format!("payload is not valid JSON: {error}")))
}
