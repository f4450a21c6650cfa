mod client;
mod envelope;
mod error;
mod handlers;
mod routes;

#[cfg(test)]
mod tests;

pub use client::ApiClient;
pub use envelope::{ApiResponse, HealthReport, Reply, StorageStatus};
pub use error::{ClientError, Result};
pub use handlers::{dispatch, health, patient_files, update_config, viewer_data};
pub use routes::Route;
