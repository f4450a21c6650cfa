mod context;
mod error;
mod logging;
mod settings;
mod viewer_service;


pub use context::{AppContext, open_backend};
pub use error::{AppError, Result, SettingsError};
pub use logging::{LOG_LEVEL_VAR, init_logging, parse_level};
pub use settings::{
    BASE_URL_VAR, ClientSettings, DATABASE_VAR, DEFAULT_BASE_URL, DEFAULT_TIMEOUT_MS, Settings,
    TIMEOUT_VAR,
};
pub use viewer_service::ViewerService;
