//! CourierBlueprint - Config Loader output
//!
//! Describes the complete engine configuration: handler thresholds and
//! capacity, local sinks, remote destinations, redaction secrets.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use validator::Validate;

use crate::{ChatRef, DestinationId, Level, RoutingMode};

/// Configuration version
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ConfigVersion {
    #[default]
    V1,
}

/// Complete engine configuration blueprint
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CourierBlueprint {
    /// Configuration version
    #[serde(default)]
    pub version: ConfigVersion,

    /// Handler settings
    #[serde(default)]
    #[validate(nested)]
    pub handler: HandlerSettings,

    /// Local sink definitions
    #[serde(default)]
    pub sinks: Vec<LocalSinkConfig>,

    /// Remote destination definitions
    #[serde(default)]
    pub destinations: Vec<DestinationConfig>,

    /// Redaction settings
    #[serde(default)]
    pub redaction: RedactionSettings,
}

/// Handler settings: buffer capacity, thresholds, dispatch cadence.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct HandlerSettings {
    /// Record buffer capacity (entries)
    #[serde(default = "default_capacity")]
    #[validate(range(min = 1))]
    pub capacity: usize,

    /// Apply buffered records to local sinks at all
    #[serde(default = "default_true")]
    pub local_dispatch: bool,

    /// Minimum severity for the local fan-out path
    #[serde(default = "default_local_level")]
    pub local_level: Level,

    /// Minimum severity for remote queuing
    #[serde(default = "default_remote_level")]
    pub remote_level: Level,

    /// Seconds between dispatch cycles
    #[serde(default = "default_flush_interval")]
    #[validate(range(min = 1))]
    pub flush_interval_secs: u64,

    /// Segment size in characters; must respect the transport limit
    #[serde(default = "default_segment_limit")]
    #[validate(range(min = 1, max = 4096))]
    pub segment_limit: usize,

    /// Batches producing more segments than this become a file attachment
    #[serde(default = "default_max_segments")]
    #[validate(range(min = 1))]
    pub max_segments: usize,

    /// Deliver every qualifying record to every destination, ignoring
    /// origin-tag routing
    #[serde(default)]
    pub force_send_all: bool,

    /// Suppress a small set of well-known noisy report messages
    #[serde(default)]
    pub suppress_common: bool,
}

impl Default for HandlerSettings {
    fn default() -> Self {
        Self {
            capacity: default_capacity(),
            local_dispatch: true,
            local_level: default_local_level(),
            remote_level: default_remote_level(),
            flush_interval_secs: default_flush_interval(),
            segment_limit: default_segment_limit(),
            max_segments: default_max_segments(),
            force_send_all: false,
            suppress_common: false,
        }
    }
}

fn default_capacity() -> usize {
    7000
}

fn default_true() -> bool {
    true
}

fn default_local_level() -> Level {
    Level::Debug
}

fn default_remote_level() -> Level {
    Level::Info
}

fn default_flush_interval() -> u64 {
    3
}

fn default_segment_limit() -> usize {
    crate::MAX_MESSAGE_CHARS
}

fn default_max_segments() -> usize {
    5
}

/// Local sink kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LocalSinkType {
    Console,
    File,
}

/// Local sink configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocalSinkConfig {
    /// Unique sink name
    pub name: String,

    /// Sink kind
    pub sink_type: LocalSinkType,

    /// Minimum severity this sink accepts
    #[serde(default = "default_sink_level")]
    pub min_level: Level,

    /// Kind-specific parameters (file path, rotation size, ...)
    #[serde(default)]
    pub params: HashMap<String, String>,
}

fn default_sink_level() -> Level {
    Level::Info
}

/// Remote destination configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DestinationConfig {
    /// Unique destination id
    pub id: DestinationId,

    /// Chat handle passed to the transport
    pub chat: ChatRef,

    /// Minimum severity this destination accepts
    #[serde(default = "default_remote_level")]
    pub min_level: Level,

    /// Routing mode
    #[serde(default)]
    pub routing: RoutingMode,

    /// Owning origin tag; required for exclusive routing
    #[serde(default)]
    pub origin: Option<String>,
}

/// Redaction settings: known secret values masked before any payload
/// leaves the process.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RedactionSettings {
    #[serde(default)]
    pub secrets: Vec<SecretSpec>,
}

/// One secret value and the placeholder shown instead of it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecretSpec {
    /// Exact substring to locate
    pub value: String,

    /// Replacement; when omitted a mask is derived from the value's shape
    #[serde(default)]
    pub mask: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_handler_defaults() {
        let settings = HandlerSettings::default();
        assert_eq!(settings.capacity, 7000);
        assert_eq!(settings.remote_level, Level::Info);
        assert_eq!(settings.segment_limit, 4096);
        assert_eq!(settings.max_segments, 5);
        assert!(settings.local_dispatch);
        assert!(!settings.force_send_all);
    }

    #[test]
    fn test_blueprint_minimal_json() {
        let blueprint: CourierBlueprint = serde_json::from_str("{}").unwrap();
        assert!(blueprint.sinks.is_empty());
        assert!(blueprint.destinations.is_empty());
        assert_eq!(blueprint.handler.capacity, 7000);
    }
}
