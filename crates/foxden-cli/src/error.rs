use thiserror::Error;

use foxden_api::ApiError;
use foxden_core::error::FoxdenError;

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Config(#[from] FoxdenError),

    #[error("request failed: {0}")]
    Api(#[from] ApiError),

    #[error("output encoding failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("config encoding failed: {0}")]
    Toml(#[from] toml::ser::Error),

    #[error("{0}")]
    Usage(String),
}
