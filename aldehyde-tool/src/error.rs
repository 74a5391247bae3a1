use aldehyde_assets::{AssetId, StoreError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AldError {
    #[error("{0}")]
    Store(#[from] StoreError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid {field}: {text:?} is not a YYYY-MM-DD date")]
    InvalidDate { field: &'static str, text: String },

    #[error("Asset not found: {0}")]
    AssetNotFound(AssetId),

    #[error("Unknown export format: {0}")]
    UnknownFormat(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}
