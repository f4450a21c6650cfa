use clap::Parser;
use tracing::debug;

use crate::api::{self, ApiClient, ApiResponse, Reply};
use crate::model::{FileKind, ModelError};
use crate::runtime::{AppContext, AppError, ClientSettings, Result, Settings};

use super::types::{Cli, Commands, PayloadArgs};

pub fn run_cli() -> Result<()> {
    let cli = Cli::parse();
    let reply = execute(&cli)?;
    println!(
        "{}",
        serde_json::to_string_pretty(&reply.body).map_err(ModelError::from)?
    );
    if !reply.is_success() {
        let message = reply.body["message"]
            .as_str()
            .unwrap_or("request failed")
            .to_string();
        return Err(AppError::Request {
            status: reply.status,
            message,
        });
    }
    Ok(())
}

pub fn load_settings(cli: &Cli) -> Result<Settings> {
    let mut settings = Settings::load(cli.config.as_deref())?;
    if let Some(database) = &cli.database {
        settings.database_path = Some(database.clone());
    }
    Ok(settings)
}

pub fn execute(cli: &Cli) -> Result<Reply> {
    let settings = load_settings(cli)?;
    debug!(command = ?cli.command, "executing command");

    let reply = match &cli.command {
        Commands::Patient { patient_id } => {
            api::patient_files(&AppContext::new(settings)?, patient_id)
        }
        Commands::Show { kind, id } => api::viewer_data(&AppContext::new(settings)?, *kind, id),
        Commands::Patch { kind, id, payload } => {
            let payload = payload.load()?;
            api::update_config(&AppContext::new(settings)?, *kind, id, payload)
        }
        Commands::Push {
            kind,
            id,
            payload,
            server,
        } => push(&settings, *kind, id, payload, server.as_deref())?,
        Commands::Health => api::health(&AppContext::new(settings)?),
    };
    Ok(reply)
}

fn push(
    settings: &Settings,
    kind: FileKind,
    id: &str,
    payload: &PayloadArgs,
    server: Option<&str>,
) -> Result<Reply> {
    let client_settings = ClientSettings {
        base_url: server
            .map(str::to_string)
            .unwrap_or_else(|| settings.client.base_url.clone()),
        ..settings.client.clone()
    };
    let client = ApiClient::new(&client_settings);
    let configs = client.update_config(kind, id, &payload.load()?)?;
    Ok(Reply::new(
        200,
        &ApiResponse::ok(
            format!("{} viewer settings saved successfully", kind.label()),
            configs,
        ),
    ))
}
