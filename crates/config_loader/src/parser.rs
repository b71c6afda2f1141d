//! Configuration parsing
//!
//! Supports TOML (primary) and JSON (optional) formats.

use contracts::{CourierBlueprint, CourierError};

/// Configuration file format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    /// TOML format (recommended)
    Toml,
    /// JSON format
    Json,
}

impl ConfigFormat {
    /// Infer format from file extension
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "toml" => Some(Self::Toml),
            "json" => Some(Self::Json),
            _ => None,
        }
    }
}

/// Parse TOML format configuration
pub fn parse_toml(content: &str) -> Result<CourierBlueprint, CourierError> {
    toml::from_str(content).map_err(|e| CourierError::ConfigParse {
        message: format!("TOML parse error: {e}"),
        source: Some(Box::new(e)),
    })
}

/// Parse JSON format configuration
pub fn parse_json(content: &str) -> Result<CourierBlueprint, CourierError> {
    serde_json::from_str(content).map_err(|e| CourierError::ConfigParse {
        message: format!("JSON parse error: {e}"),
        source: Some(Box::new(e)),
    })
}

/// Parse configuration according to format
pub fn parse(content: &str, format: ConfigFormat) -> Result<CourierBlueprint, CourierError> {
    match format {
        ConfigFormat::Toml => parse_toml(content),
        ConfigFormat::Json => parse_json(content),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::Level;

    #[test]
    fn test_parse_toml_minimal() {
        let content = r#"
[handler]
capacity = 500
local_level = "debug"

[[sinks]]
name = "console"
sink_type = "console"

[[destinations]]
id = "ops"
chat = "-100"
min_level = "warning"
"#;
        let result = parse_toml(content);
        assert!(result.is_ok(), "Failed: {:?}", result.err());
        let bp = result.unwrap();
        assert_eq!(bp.handler.capacity, 500);
        assert_eq!(bp.sinks.len(), 1);
        assert_eq!(bp.destinations[0].min_level, Level::Warning);
    }

    #[test]
    fn test_parse_empty_uses_defaults() {
        let bp = parse_toml("").unwrap();
        assert_eq!(bp.handler.capacity, 7000);
        assert!(bp.sinks.is_empty());
    }

    #[test]
    fn test_parse_json_minimal() {
        let content = r#"{
            "handler": { "capacity": 250 },
            "sinks": [{ "name": "console", "sink_type": "console" }],
            "destinations": [{ "id": "ops", "chat": "-100" }]
        }"#;
        let result = parse_json(content);
        assert!(result.is_ok(), "Failed: {:?}", result.err());
        assert_eq!(result.unwrap().handler.capacity, 250);
    }

    #[test]
    fn test_parse_toml_syntax_error() {
        let content = "invalid toml [[[";
        let result = parse_toml(content);
        assert!(result.is_err());
        let err = result.unwrap_err();
        assert!(matches!(err, CourierError::ConfigParse { .. }));
    }

    #[test]
    fn test_format_from_extension() {
        assert_eq!(
            ConfigFormat::from_extension("toml"),
            Some(ConfigFormat::Toml)
        );
        assert_eq!(
            ConfigFormat::from_extension("TOML"),
            Some(ConfigFormat::Toml)
        );
        assert_eq!(
            ConfigFormat::from_extension("json"),
            Some(ConfigFormat::Json)
        );
        assert_eq!(ConfigFormat::from_extension("yaml"), None);
    }
}
