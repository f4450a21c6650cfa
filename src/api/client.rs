use std::time::Duration;

use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, warn};

use crate::catalog::PatientDetails;
use crate::model::{FileKind, ViewerConfigRecord, ViewerConfigs};
use crate::runtime::ClientSettings;
use crate::session::ConfigSink;

use super::{ApiResponse, ClientError, HealthReport, Result, Route};

/// Blocking client for a remote viewer API.
#[derive(Clone)]
pub struct ApiClient {
    base_url: String,
    timeout: Duration,
    agent: ureq::Agent,
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter
            .debug_struct("ApiClient")
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl ApiClient {
    pub fn new(settings: &ClientSettings) -> Self {
        let timeout = Duration::from_millis(settings.timeout_ms);
        let agent = ureq::AgentBuilder::new().timeout(timeout).build();
        Self {
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            timeout,
            agent,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn url(&self, route: &Route) -> String {
        format!("{}{}", self.base_url, route.path())
    }

    pub fn patient_files(&self, patient_id: &str) -> Result<PatientDetails> {
        let route = Route::PatientFiles {
            patient_id: patient_id.to_string(),
        };
        let data = self.call(&route, None)?;
        decode(data)
    }

    pub fn viewer_data(&self, kind: FileKind, id: &str) -> Result<ViewerConfigRecord> {
        let route = Route::ViewerData {
            kind,
            id: id.to_string(),
        };
        let data = self.call(&route, None)?;
        Ok(ViewerConfigRecord::from_value(kind, data)?)
    }

    pub fn update_config(&self, kind: FileKind, id: &str, payload: &Value) -> Result<ViewerConfigs> {
        let route = Route::UpdateConfig {
            kind,
            id: id.to_string(),
        };
        let data = self.call(&route, Some(payload))?;
        Ok(ViewerConfigs::from_value(kind, data)?)
    }

    pub fn health(&self) -> Result<HealthReport> {
        let url = self.url(&Route::Health);
        let body = self.send(&Route::Health, &url, None)?;
        serde_json::from_str(&body).map_err(|error| ClientError::Decode(error.to_string()))
    }

    // Unwraps the response envelope, turning `success: false` into an error.
    fn call(&self, route: &Route, payload: Option<&Value>) -> Result<Value> {
        let url = self.url(route);
        let body = self.send(route, &url, payload)?;
        let envelope: ApiResponse<Value> = serde_json::from_str(&body)
            .map_err(|error| ClientError::Decode(format!("{url}: {error}")))?;
        if !envelope.success {
            let reason = envelope.error.unwrap_or(envelope.message);
            return Err(ClientError::Decode(format!(
                "{url}: server reported failure: {reason}"
            )));
        }
        envelope
            .data
            .ok_or_else(|| ClientError::Decode(format!("{url}: envelope carries no data")))
    }

    fn send(&self, route: &Route, url: &str, payload: Option<&Value>) -> Result<String> {
        debug!(method = route.method(), url, "sending request");
        let request = self.agent.request(route.method(), url);
        let response = match payload {
            Some(payload) => request
                .set("Content-Type", "application/json")
                .send_string(&payload.to_string()),
            None => request.call(),
        };

        match response {
            Ok(response) => response
                .into_string()
                .map_err(|error| ClientError::Decode(error.to_string())),
            Err(ureq::Error::Status(code, response)) => {
                let body = response.into_string().unwrap_or_default();
                let message = serde_json::from_str::<ApiResponse<Value>>(&body)
                    .map(|envelope| match envelope.error {
                        Some(detail) => format!("{}: {detail}", envelope.message),
                        None => envelope.message,
                    })
                    .unwrap_or(body);
                warn!(url, code, %message, "server rejected request");
                Err(ClientError::Status { code, message })
            }
            Err(ureq::Error::Transport(transport)) => {
                warn!(url, error = %transport, "request did not reach the server");
                Err(ClientError::Transport {
                    url: url.to_string(),
                    message: transport.to_string(),
                })
            }
        }
    }
}

fn decode<T: DeserializeOwned>(data: Value) -> Result<T> {
    serde_json::from_value(data).map_err(|error| ClientError::Decode(error.to_string()))
}

impl ConfigSink for ApiClient {
    type Error = ClientError;

    fn save_configs(&self, file_id: &str, configs: ViewerConfigs) -> Result<ViewerConfigs> {
        let payload = configs.to_value()?;
        self.update_config(configs.kind(), file_id, &payload)
    }
}
