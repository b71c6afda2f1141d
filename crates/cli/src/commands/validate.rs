//! `validate` command implementation.

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::info;

use crate::cli::ValidateArgs;

/// Validation result for JSON output
#[derive(Serialize)]
struct ValidationResult {
    valid: bool,
    config_path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    warnings: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    summary: Option<ConfigSummary>,
}

#[derive(Serialize)]
struct ConfigSummary {
    version: String,
    capacity: usize,
    sink_count: usize,
    destination_count: usize,
    secret_count: usize,
}

/// Execute the `validate` command
pub fn run_validate(args: &ValidateArgs) -> Result<()> {
    info!(config = %args.config.display(), "Validating configuration");

    let result = validate_config(args);

    if args.json {
        let json = serde_json::to_string_pretty(&result)
            .context("Failed to serialize validation result")?;
        println!("{}", json);
    } else {
        print_validation_result(&result);
    }

    if result.valid {
        Ok(())
    } else {
        anyhow::bail!("Configuration validation failed")
    }
}

fn validate_config(args: &ValidateArgs) -> ValidationResult {
    let config_path = args.config.display().to_string();

    // Check file exists
    if !args.config.exists() {
        return ValidationResult {
            valid: false,
            config_path,
            error: Some(format!("File not found: {}", args.config.display())),
            warnings: None,
            summary: None,
        };
    }

    // Try to load and validate
    match config_loader::ConfigLoader::load_from_path(&args.config) {
        Ok(blueprint) => {
            let warnings = collect_warnings(&blueprint);

            ValidationResult {
                valid: true,
                config_path,
                error: None,
                warnings: if warnings.is_empty() {
                    None
                } else {
                    Some(warnings)
                },
                summary: Some(ConfigSummary {
                    version: format!("{:?}", blueprint.version),
                    capacity: blueprint.handler.capacity,
                    sink_count: blueprint.sinks.len(),
                    destination_count: blueprint.destinations.len(),
                    secret_count: blueprint.redaction.secrets.len(),
                }),
            }
        }
        Err(e) => ValidationResult {
            valid: false,
            config_path,
            error: Some(e.to_string()),
            warnings: None,
            summary: None,
        },
    }
}

/// Collect configuration warnings (non-fatal issues)
fn collect_warnings(blueprint: &contracts::CourierBlueprint) -> Vec<String> {
    let mut warnings = Vec::new();

    if blueprint.sinks.is_empty() {
        warnings.push("No local sinks configured - records are only kept in memory".to_string());
    }

    if blueprint.destinations.is_empty() {
        warnings.push("No destinations configured - remote dispatch is idle".to_string());
    }

    // Destinations below the handler's remote threshold never receive
    // anything; records are filtered before they reach the queue.
    for destination in &blueprint.destinations {
        if destination.min_level < blueprint.handler.remote_level {
            warnings.push(format!(
                "Destination '{}' accepts {} but the handler only queues {} and above",
                destination.id, destination.min_level, blueprint.handler.remote_level
            ));
        }
    }

    if blueprint.handler.force_send_all {
        warnings.push(
            "force_send_all is enabled - origin routing is bypassed for every record".to_string(),
        );
    }

    if !blueprint.destinations.is_empty() && blueprint.redaction.secrets.is_empty() {
        warnings.push(
            "Destinations configured without redaction secrets - payloads leave unmasked"
                .to_string(),
        );
    }

    warnings
}

fn print_validation_result(result: &ValidationResult) {
    if result.valid {
        println!("✓ Configuration is valid: {}", result.config_path);

        if let Some(ref summary) = result.summary {
            println!("\n  Version: {}", summary.version);
            println!("  Capacity: {}", summary.capacity);
            println!("  Sinks: {}", summary.sink_count);
            println!("  Destinations: {}", summary.destination_count);
            println!("  Redaction secrets: {}", summary.secret_count);
        }

        if let Some(ref warnings) = result.warnings {
            println!("\n⚠ Warnings:");
            for warning in warnings {
                println!("  - {}", warning);
            }
        }
    } else {
        println!("✗ Configuration is invalid: {}", result.config_path);
        if let Some(ref error) = result.error {
            println!("\n  Error: {}", error);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args_for(path: &std::path::Path) -> ValidateArgs {
        ValidateArgs {
            config: path.to_path_buf(),
            json: false,
        }
    }

    #[test]
    fn test_validate_accepts_good_config() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("courier.toml");
        std::fs::write(
            &path,
            "[handler]\ncapacity = 10\n\n[[destinations]]\nid = \"ops\"\nchat = \"-1\"\n",
        )
        .unwrap();

        assert!(run_validate(&args_for(&path)).is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_config() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("courier.toml");
        std::fs::write(&path, "[handler]\ncapacity = 0\n").unwrap();

        assert!(run_validate(&args_for(&path)).is_err());
    }

    #[test]
    fn test_validate_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nope.toml");
        assert!(run_validate(&args_for(&path)).is_err());
    }

    #[test]
    fn test_warnings_flag_unreachable_destination() {
        let blueprint = config_loader::ConfigLoader::load_from_str(
            "[handler]\nremote_level = \"error\"\n\n[[destinations]]\nid = \"ops\"\nchat = \"-1\"\nmin_level = \"info\"\n",
            config_loader::ConfigFormat::Toml,
        )
        .unwrap();

        let warnings = collect_warnings(&blueprint);
        assert!(warnings.iter().any(|w| w.contains("ops")));
    }
}
