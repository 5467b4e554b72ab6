//! CLI error types with exit code handling

use miette::Diagnostic;
use thiserror::Error;

use crate::exit_codes;

/// CLI-specific error type that includes exit code information
#[derive(Error, Debug, Diagnostic, Clone)]
pub enum CliError {
    /// Invalid strategy name, mappings file or threshold
    #[error("Configuration error: {message}")]
    #[diagnostic(code(relok::cli::config))]
    Config {
        message: String,
        #[help]
        help: Option<String>,
    },

    /// Chart could not be found or loaded
    #[error("Chart error: {message}")]
    #[diagnostic(code(relok::cli::chart))]
    Chart { message: String },

    /// Strict mode found image-like structures it cannot relocate
    #[error("{count} unsupported image structure(s) found in strict mode")]
    #[diagnostic(
        code(relok::cli::unsupported),
        help("re-run `relok inspect` for per-path details, or drop --strict to skip them")
    )]
    UnsupportedStructures { count: usize },

    /// Relocation match rate fell below the configured threshold
    #[error("Match rate {rate}% is below the required threshold of {threshold}%")]
    #[diagnostic(code(relok::cli::threshold))]
    ThresholdNotMet { rate: u32, threshold: u32 },

    /// IO error (file not found, permissions, etc.)
    #[error("IO error: {message}")]
    #[diagnostic(code(relok::cli::io))]
    Io { message: String },

    /// Internal error (invariant violation, unexpected failure)
    #[error("Internal error: {message}")]
    #[diagnostic(code(relok::cli::internal))]
    Internal { message: String },
}

impl CliError {
    /// Get the exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Config { .. } => exit_codes::CONFIG_ERROR,
            CliError::Chart { .. } => exit_codes::CHART_ERROR,
            CliError::UnsupportedStructures { .. } => exit_codes::UNSUPPORTED_STRUCTURE,
            CliError::ThresholdNotMet { .. } => exit_codes::THRESHOLD_NOT_MET,
            CliError::Io { .. } => exit_codes::IO_ERROR,
            CliError::Internal { .. } => exit_codes::ERROR,
        }
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
            help: None,
        }
    }

    pub fn config_with_help(message: impl Into<String>, help: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
            help: Some(help.into()),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }
}

impl From<std::io::Error> for CliError {
    fn from(err: std::io::Error) -> Self {
        CliError::Io {
            message: err.to_string(),
        }
    }
}

impl From<relok_core::CoreError> for CliError {
    fn from(err: relok_core::CoreError) -> Self {
        use relok_core::CoreError;
        match err {
            CoreError::UnknownStrategy { .. }
            | CoreError::InvalidThreshold { .. }
            | CoreError::InvalidMappings { .. } => CliError::config(err.to_string()),
            CoreError::BuilderConflict { .. } => CliError::internal(err.to_string()),
            CoreError::Io(e) => CliError::from(e),
            other => CliError::Internal {
                message: other.to_string(),
            },
        }
    }
}

impl From<relok_chart::ChartError> for CliError {
    fn from(err: relok_chart::ChartError) -> Self {
        match err {
            relok_chart::ChartError::Io(e) => CliError::from(e),
            other => CliError::Chart {
                message: other.to_string(),
            },
        }
    }
}

/// Result type for CLI operations
pub type Result<T> = std::result::Result<T, CliError>;
