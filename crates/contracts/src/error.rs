//! Layered error definitions
//!
//! Categorized by source: config / channel / sink / install

use thiserror::Error;

/// Unified error type
#[derive(Debug, Error)]
pub enum CourierError {
    // ===== Configuration Errors =====
    /// Configuration parse error
    #[error("config parse error: {message}")]
    ConfigParse {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Configuration validation error
    #[error("config validation error at '{field}': {message}")]
    ConfigValidation { field: String, message: String },

    /// Unknown severity level name
    #[error("unknown level: '{value}'")]
    InvalidLevel { value: String },

    // ===== Channel Errors =====
    /// Remote channel send error
    #[error("channel send to '{chat}' failed: {message}")]
    ChannelSend { chat: String, message: String },

    /// Payload exceeds the transport's single-message limit
    #[error("payload of {length} chars exceeds the {limit}-char message limit")]
    PayloadTooLarge { length: usize, limit: usize },

    // ===== Sink Errors =====
    /// Local sink write error
    #[error("sink '{sink_name}' write error: {message}")]
    SinkWrite { sink_name: String, message: String },

    // ===== Installer Errors =====
    /// Package installation error
    #[error("install of '{package}' failed: {message}")]
    Install { package: String, message: String },

    // ===== General Errors =====
    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Other error
    #[error("{0}")]
    Other(String),
}

impl CourierError {
    /// Create configuration parse error
    pub fn config_parse(message: impl Into<String>) -> Self {
        Self::ConfigParse {
            message: message.into(),
            source: None,
        }
    }

    /// Create configuration validation error
    pub fn config_validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ConfigValidation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create unknown-level error
    pub fn invalid_level(value: impl Into<String>) -> Self {
        Self::InvalidLevel {
            value: value.into(),
        }
    }

    /// Create channel send error
    pub fn channel_send(chat: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ChannelSend {
            chat: chat.into(),
            message: message.into(),
        }
    }

    /// Create sink write error
    pub fn sink_write(sink_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::SinkWrite {
            sink_name: sink_name.into(),
            message: message.into(),
        }
    }

    /// Create install error
    pub fn install(package: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Install {
            package: package.into(),
            message: message.into(),
        }
    }
}
