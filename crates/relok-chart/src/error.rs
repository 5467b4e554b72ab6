//! Chart loading error types

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ChartError {
    #[error("Chart not found: {path}")]
    NotFound { path: PathBuf },

    #[error("Invalid Chart.yaml at {path}: {message}")]
    InvalidManifest { path: PathBuf, message: String },

    #[error("Failed to parse YAML: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    #[error(transparent)]
    Values(#[from] relok_core::CoreError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ChartError>;
