use thiserror::Error;

use crate::http::HttpError;

/// Errors raised by the `parcel` binary outside of a single API call.
#[derive(Debug, Error)]
pub enum ParcelError {
    #[error("Config error: {0}")]
    Config(String),

    #[error("API error: {0}")]
    Api(#[from] HttpError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
}
