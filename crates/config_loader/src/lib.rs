//! # Config Loader
//!
//! Configuration loading and parsing module.
//!
//! Responsibilities:
//! - Parse TOML/JSON configuration files
//! - Validate configuration legality
//! - Generate `CourierBlueprint`
//!
//! # Example
//!
//! ```no_run
//! use config_loader::ConfigLoader;
//! use std::path::Path;
//!
//! let blueprint = ConfigLoader::load_from_path(Path::new("courier.toml")).unwrap();
//! println!("capacity: {}", blueprint.handler.capacity);
//! ```

mod parser;
mod validator;

pub use contracts::CourierBlueprint;
pub use parser::ConfigFormat;

use contracts::CourierError;
use std::path::Path;

/// Configuration loader
///
/// Provides static methods to load configuration from files or strings.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from file path
    ///
    /// Automatically detects format from file extension (.toml / .json).
    ///
    /// # Errors
    /// - File read failure
    /// - Unsupported format
    /// - Parse failure
    /// - Validation failure
    pub fn load_from_path(path: &Path) -> Result<CourierBlueprint, CourierError> {
        let format = Self::detect_format(path)?;
        let content = Self::read_file(path)?;
        Self::load_from_str(&content, format)
    }

    /// Load configuration from string
    ///
    /// # Errors
    /// - Parse failure
    /// - Validation failure
    pub fn load_from_str(
        content: &str,
        format: ConfigFormat,
    ) -> Result<CourierBlueprint, CourierError> {
        Self::parse_and_validate(content, format)
    }

    /// Serialize CourierBlueprint to TOML string
    pub fn to_toml(blueprint: &CourierBlueprint) -> Result<String, CourierError> {
        toml::to_string_pretty(blueprint)
            .map_err(|e| CourierError::config_parse(format!("TOML serialize error: {e}")))
    }

    /// Serialize CourierBlueprint to JSON string
    pub fn to_json(blueprint: &CourierBlueprint) -> Result<String, CourierError> {
        serde_json::to_string_pretty(blueprint)
            .map_err(|e| CourierError::config_parse(format!("JSON serialize error: {e}")))
    }
}

impl ConfigLoader {
    /// Infer configuration format from file extension
    fn detect_format(path: &Path) -> Result<ConfigFormat, CourierError> {
        let ext = path.extension().and_then(|e| e.to_str()).ok_or_else(|| {
            CourierError::config_parse("cannot determine file format from extension")
        })?;

        ConfigFormat::from_extension(ext).ok_or_else(|| {
            CourierError::config_parse(format!("unsupported config format: .{ext}"))
        })
    }

    /// Read configuration file content
    fn read_file(path: &Path) -> Result<String, CourierError> {
        Ok(std::fs::read_to_string(path)?)
    }

    /// Parse and validate configuration content
    fn parse_and_validate(
        content: &str,
        format: ConfigFormat,
    ) -> Result<CourierBlueprint, CourierError> {
        let blueprint = parser::parse(content, format)?;
        validator::validate(&blueprint)?;
        Ok(blueprint)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::{Level, RoutingMode};

    const MINIMAL_TOML: &str = r#"
[handler]
capacity = 100
remote_level = "warning"

[[sinks]]
name = "console"
sink_type = "console"
min_level = "info"

[[sinks]]
name = "logfile"
sink_type = "file"
min_level = "debug"
[sinks.params]
path = "courier.log"

[[destinations]]
id = "ops"
chat = "-100200300"
min_level = "error"
routing = "broadcast"

[[destinations]]
id = "client1-log"
chat = "-100200301"
routing = "exclusive"
origin = "client1"

[[redaction.secrets]]
value = "12345678:AAF0abcdef"
"#;

    #[test]
    fn test_load_from_str_toml() {
        let result = ConfigLoader::load_from_str(MINIMAL_TOML, ConfigFormat::Toml);
        assert!(result.is_ok(), "Failed: {:?}", result.err());
        let bp = result.unwrap();
        assert_eq!(bp.handler.capacity, 100);
        assert_eq!(bp.handler.remote_level, Level::Warning);
        assert_eq!(bp.sinks.len(), 2);
        assert_eq!(bp.destinations.len(), 2);
        assert_eq!(bp.destinations[1].routing, RoutingMode::Exclusive);
    }

    #[test]
    fn test_round_trip_toml() {
        let bp = ConfigLoader::load_from_str(MINIMAL_TOML, ConfigFormat::Toml).unwrap();
        let serialized = ConfigLoader::to_toml(&bp).unwrap();
        let bp2 = ConfigLoader::load_from_str(&serialized, ConfigFormat::Toml).unwrap();
        assert_eq!(bp.handler.capacity, bp2.handler.capacity);
        assert_eq!(bp.sinks.len(), bp2.sinks.len());
        assert_eq!(bp.destinations[0].id, bp2.destinations[0].id);
    }

    #[test]
    fn test_round_trip_json() {
        let bp = ConfigLoader::load_from_str(MINIMAL_TOML, ConfigFormat::Toml).unwrap();
        let json = ConfigLoader::to_json(&bp).unwrap();
        let bp2 = ConfigLoader::load_from_str(&json, ConfigFormat::Json).unwrap();
        assert_eq!(bp.handler.capacity, bp2.handler.capacity);
    }

    #[test]
    fn test_validation_runs_after_parse() {
        // Duplicate destination id should fail validation
        let content = r#"
[[destinations]]
id = "ops"
chat = "-1"

[[destinations]]
id = "ops"
chat = "-2"
"#;
        let result = ConfigLoader::load_from_str(content, ConfigFormat::Toml);
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("duplicate"));
    }
}
