//! Core error types

use thiserror::Error;

use crate::values::ValuePath;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Unknown path strategy: {name}")]
    UnknownStrategy { name: String },

    #[error("Invalid threshold {value}: must be between 0 and 100")]
    InvalidThreshold { value: u32 },

    #[error("Invalid registry mappings: {message}")]
    InvalidMappings { message: String },

    #[error("Invalid image reference '{value}': {message}")]
    InvalidReference { value: String, message: String },

    #[error("Conflicting override at {path}: {message}")]
    BuilderConflict { path: ValuePath, message: String },

    #[error("Failed to parse YAML: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    #[error("Failed to parse JSON: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl CoreError {
    /// True for errors that must abort before or during a run: bad strategy
    /// names, malformed mappings, invalid thresholds, builder conflicts.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            CoreError::UnknownStrategy { .. }
                | CoreError::InvalidThreshold { .. }
                | CoreError::InvalidMappings { .. }
                | CoreError::BuilderConflict { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, CoreError>;
