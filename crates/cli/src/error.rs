//! Error types for CLI operations.

use thiserror::Error;

/// CLI-specific error types
#[allow(dead_code)]
#[derive(Error, Debug)]
pub enum CliError {
    /// Configuration file not found
    #[error("Configuration file not found: {path}")]
    ConfigNotFound { path: String },

    /// Configuration parsing error
    #[error("Failed to parse configuration: {message}")]
    ConfigParse { message: String },

    /// Configuration validation error
    #[error("Configuration validation failed: {message}")]
    ConfigValidation { message: String },

    /// Event input error
    #[error("Failed to read event input from {source_name}: {message}")]
    EventInput {
        source_name: String,
        message: String,
    },

    /// Engine execution error
    #[error("Engine execution failed: {message}")]
    EngineExecution { message: String },

    /// Graceful shutdown error
    #[error("Error during shutdown: {message}")]
    Shutdown { message: String },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic error wrapper
    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

#[allow(dead_code)]
impl CliError {
    pub fn config_not_found(path: impl Into<String>) -> Self {
        Self::ConfigNotFound { path: path.into() }
    }

    pub fn config_parse(message: impl Into<String>) -> Self {
        Self::ConfigParse {
            message: message.into(),
        }
    }

    pub fn config_validation(message: impl Into<String>) -> Self {
        Self::ConfigValidation {
            message: message.into(),
        }
    }

    pub fn event_input(source_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::EventInput {
            source_name: source_name.into(),
            message: message.into(),
        }
    }

    pub fn engine_execution(message: impl Into<String>) -> Self {
        Self::EngineExecution {
            message: message.into(),
        }
    }

    pub fn shutdown(message: impl Into<String>) -> Self {
        Self::Shutdown {
            message: message.into(),
        }
    }
}

/// Result type alias for CLI operations
#[allow(dead_code)]
pub type Result<T> = std::result::Result<T, CliError>;
