use chrono::Utc;
use serde_json::Value;
use tracing::{debug, error, warn};

use crate::model::FileKind;
use crate::runtime::{AppContext, AppError};

use super::{ApiResponse, HealthReport, Reply, Route, StorageStatus};

const HEALTH_MESSAGE: &str = "mediview API is running";

/// Turns a failed request into its envelope. Not-found errors carry their own
/// message; everything else gets `fallback` plus a short public reason.
fn failure(error: AppError, fallback: String) -> Reply {
    let status = error.status();
    let envelope: ApiResponse<Value> = if status == 404 {
        debug!(%error, "lookup failed");
        ApiResponse::failure(error.to_string(), None)
    } else {
        if status >= 500 {
            error!(error = ?error, "request failed");
        } else {
            warn!(%error, "request rejected");
        }
        ApiResponse::failure(fallback, Some(error.public_message()))
    };
    Reply::new(status, &envelope)
}

pub fn patient_files(context: &AppContext, patient_id: &str) -> Reply {
    match context.viewer_service().patient_files(patient_id) {
        Ok(patient) => Reply::new(
            200,
            &ApiResponse::ok("Patient data fetched successfully", patient),
        ),
        Err(error) => failure(error, "Error fetching patient data".to_string()),
    }
}

pub fn viewer_data(context: &AppContext, kind: FileKind, id: &str) -> Reply {
    match context.viewer_service().viewer_data(kind, id) {
        Ok(record) => Reply::new(
            200,
            &ApiResponse::ok(format!("{} data fetched successfully", kind.label()), record),
        ),
        Err(error) => failure(error, format!("Error fetching {kind} data")),
    }
}

pub fn update_config(context: &AppContext, kind: FileKind, id: &str, payload: Value) -> Reply {
    match context.viewer_service().update_config(kind, id, payload) {
        Ok(configs) => Reply::new(
            200,
            &ApiResponse::ok(
                format!("{} viewer settings saved successfully", kind.label()),
                configs,
            ),
        ),
        Err(error) => failure(error, format!("Error updating {kind} config")),
    }
}

pub fn health(context: &AppContext) -> Reply {
    let backend = context.backend();
    let report = HealthReport {
        status: "OK".to_string(),
        message: HEALTH_MESSAGE.to_string(),
        timestamp: Utc::now(),
        database: StorageStatus {
            connected: backend.is_durable(),
            kind: backend.describe().to_string(),
        },
    };
    Reply::new(200, &report)
}

/// Routes a raw request. `body` is the unparsed request body, if any; an
/// empty body counts as an empty update.
pub fn dispatch(context: &AppContext, method: &str, path: &str, body: Option<&str>) -> Reply {
    let Some(route) = Route::parse(method, path) else {
        debug!(method, path, "no route matched");
        return Reply::new(
            404,
            &ApiResponse::<Value>::failure(format!("Cannot {method} {path}"), None),
        );
    };
    match route {
        Route::Health => health(context),
        Route::PatientFiles { patient_id } => patient_files(context, &patient_id),
        Route::ViewerData { kind, id } => viewer_data(context, kind, &id),
        Route::UpdateConfig { kind, id } => {
            let payload = match body.map(str::trim).filter(|raw| !raw.is_empty()) {
                None => Value::Null,
                Some(raw) => match serde_json::from_str(raw) {
                    Ok(payload) => payload,
                    Err(parse_error) => {
                        warn!(file_id = %id, kind = %kind, %parse_error, "request body is not JSON");
                        return Reply::new(
                            400,
                            &ApiResponse::<Value>::failure(
                                format!("Error updating {kind} config"),
                                Some(format!("request body is not valid JSON: {parse_error}")),
                            ),
                        );
                    }
                },
            };
            update_config(context, kind, &id, payload)
        }
    }
}
